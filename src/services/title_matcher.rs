//! Title match selection among search results
//!
//! Remote searches return a handful of loosely ranked candidates; this
//! module picks the one whose title actually resembles what we asked
//! for. When nothing clears the similarity threshold the FIRST candidate
//! is returned anyway: a mediocre match beats no metadata at all, and
//! the update applier never overwrites existing values either way.

use std::collections::HashSet;

/// Minimum similarity for a candidate to win on merit.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Jaccard index of the whitespace-tokenized word sets of both titles,
/// after lowercasing and trimming. 0.0 when either side has no tokens.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    let a_tokens: HashSet<&str> = a.split_whitespace().collect();
    let b_tokens: HashSet<&str> = b.split_whitespace().collect();

    if a_tokens.is_empty() || b_tokens.is_empty() {
        return 0.0;
    }

    let intersection = a_tokens.intersection(&b_tokens).count();
    let union = a_tokens.union(&b_tokens).count();

    intersection as f64 / union as f64
}

/// Select the best-matching candidate for `target_title`.
///
/// Deterministic: ties keep the first-seen candidate because only a
/// strictly greater score replaces the current best. Returns `None`
/// only for an empty candidate list.
pub fn select_best_match<'a, T>(target_title: &str, candidates: &'a [(String, T)]) -> Option<&'a T> {
    if candidates.is_empty() {
        return None;
    }

    let mut best: Option<&(String, T)> = None;
    let mut best_score = 0.0_f64;

    for candidate in candidates {
        let score = title_similarity(target_title, &candidate.0);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }

    if best_score > MATCH_THRESHOLD {
        best.map(|(_, item)| item)
    } else {
        candidates.first().map(|(_, item)| item)
    }
}
