//! Field normalization shared by the source adapters
//!
//! Both remote sources hand back free-form values; everything that ends
//! up in a `BookMetadata` goes through these helpers first.

use once_cell::sync::Lazy;
use regex::Regex;

/// Longest description stored before truncation kicks in.
pub const DESCRIPTION_LIMIT: usize = 500;

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

/// Pull a 4-digit 19xx/20xx year out of a free-form date string,
/// falling back to its first 4 characters when no pattern matches.
pub fn extract_year(date_string: &str) -> String {
    if date_string.is_empty() {
        return String::new();
    }

    match YEAR_RE.find(date_string) {
        Some(m) => m.as_str().to_string(),
        None => date_string.chars().take(4).collect(),
    }
}

/// Cap a description at `DESCRIPTION_LIMIT` characters, marking the cut
/// with a trailing ellipsis.
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_LIMIT {
        let truncated: String = description.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{}...", truncated)
    } else {
        description.to_string()
    }
}

/// ISBN shape check: 13 digits, or 9 digits plus a digit/X check
/// character.
pub fn is_valid_isbn(isbn: &str) -> bool {
    let bytes = isbn.as_bytes();
    match bytes.len() {
        13 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[..9].iter().all(u8::is_ascii_digit)
                && (bytes[9].is_ascii_digit() || bytes[9] == b'X' || bytes[9] == b'x')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_from_iso_date() {
        assert_eq!(extract_year("1965-08-01"), "1965");
        assert_eq!(extract_year("2004-07"), "2004");
    }

    #[test]
    fn year_from_prose_date() {
        assert_eq!(extract_year("First published July 1965"), "1965");
    }

    #[test]
    fn year_fallback_takes_first_four_chars() {
        assert_eq!(extract_year("circa 800"), "circ");
        assert_eq!(extract_year("n.d."), "n.d.");
    }

    #[test]
    fn year_empty_input() {
        assert_eq!(extract_year(""), "");
    }

    #[test]
    fn short_description_unchanged() {
        assert_eq!(truncate_description("A classic."), "A classic.");
    }

    #[test]
    fn long_description_truncated_with_ellipsis() {
        let long: String = "x".repeat(DESCRIPTION_LIMIT + 50);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.len(), DESCRIPTION_LIMIT + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let long: String = "ä".repeat(DESCRIPTION_LIMIT + 1);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), DESCRIPTION_LIMIT + 3);
    }

    #[test]
    fn isbn_shapes() {
        assert!(is_valid_isbn("9780441013593"));
        assert!(is_valid_isbn("0441013597"));
        assert!(is_valid_isbn("044101359X"));
        assert!(!is_valid_isbn(""));
        assert!(!is_valid_isbn("978-0441013593"));
        assert!(!is_valid_isbn("97804410135"));
        assert!(!is_valid_isbn("X441013597"));
    }
}
