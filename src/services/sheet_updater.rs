//! Non-destructive row updates
//!
//! Computes the per-row diff between the record snapshot and the
//! resolved metadata, then writes only cells that are currently empty.
//! Cell writes are independent API calls: when one fails mid-row the
//! earlier writes stand, the remaining fields are still attempted, and
//! the row is left partially updated for the next run to finish.

use tracing::{debug, error, info};

use crate::store::RecordStore;
use crate::types::{BookMetadata, BookRecord, FieldMapping};

pub struct SheetUpdater {
    mapping: FieldMapping,
    dry_run: bool,
}

impl SheetUpdater {
    pub fn new(mapping: FieldMapping, dry_run: bool) -> Self {
        Self { mapping, dry_run }
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    /// Fill the record's empty cells from `metadata`.
    ///
    /// Returns true when at least one field changed, or would change in
    /// dry-run mode. A clean record returns false without contacting
    /// the store, which is what makes repeated runs idempotent.
    pub async fn apply_row(
        &self,
        store: &dyn RecordStore,
        record: &BookRecord,
        metadata: &BookMetadata,
    ) -> bool {
        let mut updates: Vec<(&str, String)> = Vec::new();

        for (store_field, metadata_field) in self.mapping.entries() {
            let current_value = record.get(store_field).trim();
            let new_value = metadata.value(*metadata_field);
            let new_value = new_value.trim();

            if current_value.is_empty() && !new_value.is_empty() {
                updates.push((store_field.as_str(), new_value.to_string()));
            }
        }

        if updates.is_empty() {
            debug!(row = record.row_index, "No updates needed");
            return false;
        }

        if self.dry_run {
            info!(
                row = record.row_index,
                updates = ?updates,
                "DRY RUN - would update"
            );
            return true;
        }

        for (field, value) in &updates {
            let col = match store.find_column_index(field).await {
                Ok(col) => col,
                Err(err) => {
                    error!(
                        row = record.row_index,
                        field = %field,
                        error = %err,
                        "Column lookup failed, skipping field"
                    );
                    continue;
                }
            };

            match store.write_cell(record.row_index, col, value).await {
                Ok(()) => {
                    debug!(row = record.row_index, field = %field, value = %value, "Updated field");
                }
                Err(err) => {
                    error!(
                        row = record.row_index,
                        field = %field,
                        error = %err,
                        "Cell update failed, row left partially updated"
                    );
                }
            }
        }

        info!(
            row = record.row_index,
            fields = updates.len(),
            "Row update applied"
        );
        true
    }
}
