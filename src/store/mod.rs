//! External record store abstraction
//!
//! The pipeline treats the tabular store as a single-writer collaborator
//! behind the `RecordStore` trait: ordered rows keyed by header name,
//! addressed by 1-based row/column indices for writes.

mod google_sheets;

pub use google_sheets::GoogleSheetsStore;

use thiserror::Error;

use crate::types::BookRecord;

/// Store collaborator errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Ordered, header-addressed tabular store holding the book records.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// All data rows in sheet order. The first sheet row is treated as
    /// the header; records start at sheet row 2.
    async fn list_records(&self) -> Result<Vec<BookRecord>, StoreError>;

    /// 1-based column index of a header field.
    async fn find_column_index(&self, field: &str) -> Result<usize, StoreError>;

    /// Write a single cell (1-based row and column).
    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError>;
}
