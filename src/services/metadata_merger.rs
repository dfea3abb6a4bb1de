//! Field-level merge of multi-source metadata
//!
//! The primary source (historically the more reliable one) wins on
//! every field it filled; the secondary source only plugs the holes.
//! Deliberately not commutative: `merge(a, b) != merge(b, a)` whenever
//! both sides disagree on a filled field.

use crate::types::BookMetadata;

/// Combine two partial records by field precedence.
///
/// Both absent yields `None`; exactly one present is returned
/// unchanged; otherwise `primary` is the base and empty fields are
/// copied over from `secondary`.
pub fn merge(
    primary: Option<BookMetadata>,
    secondary: Option<BookMetadata>,
) -> Option<BookMetadata> {
    let (mut merged, secondary) = match (primary, secondary) {
        (None, None) => return None,
        (Some(primary), None) => return Some(primary),
        (None, Some(secondary)) => return Some(secondary),
        (Some(primary), Some(secondary)) => (primary, secondary),
    };

    fill(&mut merged.title, secondary.title);
    fill(&mut merged.authors, secondary.authors);
    fill(&mut merged.publisher, secondary.publisher);
    fill(&mut merged.published_year, secondary.published_year);
    fill(&mut merged.isbn, secondary.isbn);
    fill(&mut merged.categories, secondary.categories);
    if merged.page_count == 0 {
        merged.page_count = secondary.page_count;
    }
    fill(&mut merged.language, secondary.language);
    fill(&mut merged.description, secondary.description);

    Some(merged)
}

fn fill(current: &mut String, fallback: String) {
    if current.is_empty() && !fallback.is_empty() {
        *current = fallback;
    }
}
