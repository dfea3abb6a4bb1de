//! Run orchestration
//!
//! Pulls the full record set, partitions it into fixed-size batches,
//! resolves each batch concurrently, then applies updates from the
//! single-writer batch-completion phase. Batches run strictly
//! sequentially; a cancellation request stops scheduling further
//! batches while in-flight work drains normally.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::services::batch_processor::BatchProcessor;
use crate::services::sheet_updater::SheetUpdater;
use crate::services::snapshot::snapshot_records;
use crate::store::{RecordStore, StoreError};
use crate::types::{FieldMapping, MetadataSource, RunCounters, RunSummary};

pub struct MetadataPipeline {
    config: Config,
    mapping: FieldMapping,
    processor: BatchProcessor,
    updater: SheetUpdater,
    counters: Arc<RunCounters>,
    cancel: CancellationToken,
}

impl MetadataPipeline {
    pub fn new(
        config: Config,
        sources: Vec<Arc<dyn MetadataSource>>,
        dry_run: bool,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let mapping = config.field_mapping()?;
        let counters = Arc::new(RunCounters::new());
        let processor = BatchProcessor::new(sources, Arc::clone(&counters), config.max_workers);
        let updater = SheetUpdater::new(mapping.clone(), dry_run);

        Ok(Self {
            config,
            mapping,
            processor,
            updater,
            counters,
            cancel,
        })
    }

    /// Process every record and write back the missing fields.
    pub async fn run(&self, store: &dyn RecordStore) -> Result<RunSummary> {
        info!("Fetching existing records...");
        let records = store.list_records().await?;

        if records.is_empty() {
            warn!("No records found in the sheet");
            return Ok(self.counters.summary());
        }

        if self.config.backup_enabled {
            match snapshot_records(&records, &self.config.backup_dir) {
                Ok(path) => info!("Backup created: {}", path.display()),
                Err(err) => warn!(error = %err, "Failed to create backup"),
            }
        }

        let total = records.len();
        let batch_size = self.config.batch_size.max(1);
        let batch_count = (total + batch_size - 1) / batch_size;

        info!("Processing {} books in batches of {}", total, batch_size);

        let mut reached = 0usize;
        for (batch_index, chunk) in records.chunks(batch_size).enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    "Cancellation requested, stopping before batch {}/{}",
                    batch_index + 1,
                    batch_count
                );
                break;
            }

            info!("Processing batch {}/{}", batch_index + 1, batch_count);
            let results = self.processor.process_batch(chunk.to_vec()).await;

            // Write-back happens only here, after the whole batch has
            // resolved; worker tasks never touch the store.
            for (record, metadata) in &results {
                if let Some(metadata) = metadata {
                    if self.updater.apply_row(store, record, metadata).await {
                        self.counters.record_updated();
                    }
                }
            }

            reached += chunk.len();
            info!("Progress: {}/{} books processed", reached, total);
        }

        let summary = self.counters.summary();
        info!(
            processed = summary.processed,
            updated = summary.updated,
            failed = summary.failed,
            "Update completed"
        );

        Ok(summary)
    }

    /// Check that every mapped column exists in the sheet header,
    /// returning the missing ones.
    pub async fn validate_structure(&self, store: &dyn RecordStore) -> Result<Vec<String>> {
        let mut missing = Vec::new();

        for (store_field, _) in self.mapping.entries() {
            match store.find_column_index(store_field).await {
                Ok(_) => {}
                Err(StoreError::ColumnNotFound(_)) => missing.push(store_field.clone()),
                Err(err) => return Err(err.into()),
            }
        }

        Ok(missing)
    }
}
