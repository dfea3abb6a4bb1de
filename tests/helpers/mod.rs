//! Shared test doubles: an in-memory record store with a write log, and
//! canned metadata sources.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use bookmend::store::{RecordStore, StoreError};
use bookmend::types::{BookMetadata, BookRecord, MetadataSource, SourceError};

/// In-memory stand-in for the sheet. Row 1 is the header; data rows
/// start at sheet row 2. Writes to columns listed in `fail_fields`
/// error out, for partial-failure tests.
pub struct MemoryStore {
    headers: Vec<String>,
    rows: Mutex<Vec<Vec<String>>>,
    fail_fields: HashSet<String>,
    writes: Mutex<Vec<(usize, usize, String)>>,
}

impl MemoryStore {
    pub fn new(headers: &[&str], rows: Vec<Vec<&str>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Mutex::new(
                rows.into_iter()
                    .map(|row| row.into_iter().map(str::to_string).collect())
                    .collect(),
            ),
            fail_fields: HashSet::new(),
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, fields: &[&str]) -> Self {
        self.fail_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Number of successful cell writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Current value of a cell, addressed by sheet row and header name.
    pub fn cell(&self, row: usize, field: &str) -> String {
        let col = self
            .headers
            .iter()
            .position(|header| header == field)
            .expect("unknown field");
        self.rows.lock().unwrap()[row - 2][col].clone()
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn list_records(&self) -> Result<Vec<BookRecord>, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut fields = HashMap::new();
                for (col, header) in self.headers.iter().enumerate() {
                    fields.insert(header.clone(), row.get(col).cloned().unwrap_or_default());
                }
                BookRecord::new(i + 2, fields)
            })
            .collect())
    }

    async fn find_column_index(&self, field: &str) -> Result<usize, StoreError> {
        self.headers
            .iter()
            .position(|header| header == field)
            .map(|i| i + 1)
            .ok_or_else(|| StoreError::ColumnNotFound(field.to_string()))
    }

    async fn write_cell(&self, row: usize, col: usize, value: &str) -> Result<(), StoreError> {
        let field = &self.headers[col - 1];
        if self.fail_fields.contains(field) {
            return Err(StoreError::Api(500, format!("write to {} failed", field)));
        }

        self.rows.lock().unwrap()[row - 2][col - 1] = value.to_string();
        self.writes
            .lock()
            .unwrap()
            .push((row, col, value.to_string()));
        Ok(())
    }
}

/// Metadata source returning one canned result for every lookup.
pub struct StaticSource {
    pub source_name: &'static str,
    pub metadata: Option<BookMetadata>,
}

#[async_trait::async_trait]
impl MetadataSource for StaticSource {
    fn name(&self) -> &'static str {
        self.source_name
    }

    async fn fetch(&self, title: &str, _author: &str) -> Result<Option<BookMetadata>, SourceError> {
        if title.is_empty() {
            return Ok(None);
        }
        Ok(self.metadata.clone())
    }
}

/// Source that always fails at the transport level.
pub struct FailingSource;

#[async_trait::async_trait]
impl MetadataSource for FailingSource {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch(
        &self,
        _title: &str,
        _author: &str,
    ) -> Result<Option<BookMetadata>, SourceError> {
        Err(SourceError::Network("connection reset".to_string()))
    }
}
