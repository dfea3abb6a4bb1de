//! Concurrent per-batch metadata resolution
//!
//! One fetch-and-merge task per row, running inside a bounded window of
//! in-flight futures. The window is capped well below typical batch
//! sizes on purpose: the per-source rate limiter is the real throughput
//! governor, the pool just keeps a few requests overlapped.
//!
//! A task failure never aborts its siblings; it becomes a `None`
//! metadata result plus a failure count.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

use crate::services::metadata_merger::merge;
use crate::types::{BookMetadata, BookRecord, MetadataSource, RunCounters};

pub struct BatchProcessor {
    /// Ordered primary-first; merge precedence follows this order
    sources: Vec<Arc<dyn MetadataSource>>,
    counters: Arc<RunCounters>,
    max_workers: usize,
}

impl BatchProcessor {
    pub fn new(
        sources: Vec<Arc<dyn MetadataSource>>,
        counters: Arc<RunCounters>,
        max_workers: usize,
    ) -> Self {
        Self {
            sources,
            counters,
            max_workers: max_workers.max(1),
        }
    }

    /// Resolve a batch of records concurrently.
    ///
    /// Exactly one output per input. Results arrive in completion
    /// order; callers re-associate them through the embedded row index,
    /// so ordering is irrelevant downstream.
    pub async fn process_batch(
        &self,
        rows: Vec<BookRecord>,
    ) -> Vec<(BookRecord, Option<BookMetadata>)> {
        let window = self.max_workers.min(rows.len().max(1));
        let mut pending = rows.into_iter();
        let mut in_flight = FuturesUnordered::new();
        let mut results = Vec::new();

        for record in pending.by_ref().take(window) {
            in_flight.push(self.resolve_record(record));
        }

        while let Some(result) = in_flight.next().await {
            results.push(result);
            if let Some(record) = pending.next() {
                in_flight.push(self.resolve_record(record));
            }
        }

        results
    }

    /// Fetch from every source and merge, first source winning on
    /// conflicts. Source errors degrade to "no metadata" for that
    /// source only.
    async fn resolve_record(&self, record: BookRecord) -> (BookRecord, Option<BookMetadata>) {
        let title = record.get("Title").trim().to_string();
        let author = record.get("Author").trim().to_string();

        if title.is_empty() {
            return (record, None);
        }

        info!(row = record.row_index, title = %title, "Processing");

        let mut merged: Option<BookMetadata> = None;
        for source in &self.sources {
            let fetched = match source.fetch(&title, &author).await {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(
                        source = source.name(),
                        title = %title,
                        error = %err,
                        "Metadata fetch failed"
                    );
                    None
                }
            };
            merged = merge(merged, fetched);
        }

        self.counters.record_processed();
        if merged.is_some() {
            info!(row = record.row_index, title = %title, "Found metadata");
        } else {
            warn!(row = record.row_index, title = %title, "No metadata found");
            self.counters.record_failed();
        }

        (record, merged)
    }
}
