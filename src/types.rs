//! Core types and trait definitions for bookmend
//!
//! The resolution pipeline moves three shapes of data around: the
//! immutable `BookRecord` snapshot read from the sheet, the normalized
//! `BookMetadata` candidate produced by the source adapters, and the
//! `FieldMapping` that decides which sheet columns are eligible for
//! auto-fill.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// One row of the external store.
///
/// An immutable snapshot for the duration of a run; updates never mutate
/// it in place, they go back through the update applier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    /// 1-based sheet row (header is row 1, first record row 2)
    pub row_index: usize,
    /// Column name to current cell value
    pub fields: HashMap<String, String>,
}

impl BookRecord {
    pub fn new(row_index: usize, fields: HashMap<String, String>) -> Self {
        Self { row_index, fields }
    }

    /// Current value of a column, empty string when the column is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }
}

/// Normalized candidate description of a book.
///
/// Every field is optional: the empty string (or 0 for `page_count`) is
/// the universal "unknown" sentinel. Adapters are responsible for
/// normalizing their source's shape into this one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    /// Comma-joined author names
    pub authors: String,
    pub publisher: String,
    /// 4-digit year as a string, or empty
    pub published_year: String,
    /// ISBN-13 preferred, else ISBN-10
    pub isbn: String,
    /// Comma-joined categories/subjects
    pub categories: String,
    /// 0 = unknown
    pub page_count: u32,
    pub language: String,
    /// Truncated with a trailing "..." when the source text is longer
    pub description: String,
}

impl BookMetadata {
    /// Value of one attribute as a cell string. An unknown page count
    /// renders as the empty string so it is never written to the sheet.
    pub fn value(&self, field: MetadataField) -> String {
        match field {
            MetadataField::Title => self.title.clone(),
            MetadataField::Authors => self.authors.clone(),
            MetadataField::Publisher => self.publisher.clone(),
            MetadataField::PublishedYear => self.published_year.clone(),
            MetadataField::Isbn => self.isbn.clone(),
            MetadataField::Categories => self.categories.clone(),
            MetadataField::PageCount => {
                if self.page_count == 0 {
                    String::new()
                } else {
                    self.page_count.to_string()
                }
            }
            MetadataField::Language => self.language.clone(),
            MetadataField::Description => self.description.clone(),
        }
    }
}

/// Attributes of `BookMetadata` addressable from the field mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    Title,
    Authors,
    Publisher,
    PublishedYear,
    Isbn,
    Categories,
    PageCount,
    Language,
    Description,
}

impl MetadataField {
    /// Parse the snake_case attribute name used in configuration files.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "authors" => Some(Self::Authors),
            "publisher" => Some(Self::Publisher),
            "published_year" => Some(Self::PublishedYear),
            "isbn" => Some(Self::Isbn),
            "categories" => Some(Self::Categories),
            "page_count" => Some(Self::PageCount),
            "language" => Some(Self::Language),
            "description" => Some(Self::Description),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Authors => "authors",
            Self::Publisher => "publisher",
            Self::PublishedYear => "published_year",
            Self::Isbn => "isbn",
            Self::Categories => "categories",
            Self::PageCount => "page_count",
            Self::Language => "language",
            Self::Description => "description",
        }
    }
}

/// Ordered mapping from sheet column name to metadata attribute.
///
/// Fixed for the lifetime of a run; defines which columns are eligible
/// for auto-fill and in which order updates are attempted.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    entries: Vec<(String, MetadataField)>,
}

impl FieldMapping {
    pub fn new(entries: Vec<(String, MetadataField)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, MetadataField)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run-level progress counters.
///
/// Incremented concurrently by worker tasks; reset by constructing a
/// fresh instance at run start.
#[derive(Debug, Default)]
pub struct RunCounters {
    processed: AtomicUsize,
    updated: AtomicUsize,
    failed: AtomicUsize,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_updated(&self) {
        self.updated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            processed: self.processed.load(Ordering::Relaxed),
            updated: self.updated.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Final tallies for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub updated: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed: {}, Updated: {}, Failed: {}",
            self.processed, self.updated, self.failed
        )
    }
}

/// Source adapter errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A remote bibliographic search service.
///
/// Implementations normalize their API's shape into `BookMetadata`.
/// `Ok(None)` means the source had nothing usable (empty title, no
/// search results); `Err` is reserved for transport-level failures
/// after the retry policy is exhausted, which the batch layer converts
/// into "no metadata" so a single source outage never aborts a run.
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Source name for rate limiting and log provenance
    fn name(&self) -> &'static str;

    async fn fetch(&self, title: &str, author: &str) -> Result<Option<BookMetadata>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_get_missing_field_is_empty() {
        let record = BookRecord::new(2, HashMap::new());
        assert_eq!(record.get("Title"), "");
    }

    #[test]
    fn metadata_field_parse_round_trip() {
        for name in [
            "title",
            "authors",
            "publisher",
            "published_year",
            "isbn",
            "categories",
            "page_count",
            "language",
            "description",
        ] {
            let field = MetadataField::parse(name).unwrap();
            assert_eq!(field.as_str(), name);
        }
        assert!(MetadataField::parse("pages").is_none());
    }

    #[test]
    fn unknown_page_count_renders_empty() {
        let metadata = BookMetadata::default();
        assert_eq!(metadata.value(MetadataField::PageCount), "");

        let metadata = BookMetadata {
            page_count: 412,
            ..Default::default()
        };
        assert_eq!(metadata.value(MetadataField::PageCount), "412");
    }

    #[test]
    fn counters_accumulate() {
        let counters = RunCounters::new();
        counters.record_processed();
        counters.record_processed();
        counters.record_updated();
        counters.record_failed();

        let summary = counters.summary();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.failed, 1);
    }
}
