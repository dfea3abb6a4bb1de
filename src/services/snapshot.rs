//! Pre-update snapshot of the store contents
//!
//! Written once per run before any cell is touched. Strictly
//! best-effort: the caller logs a failure and carries on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::BookRecord;

/// Persist the record snapshot as pretty JSON under `dir`, returning
/// the file path.
pub fn snapshot_records(records: &[BookRecord], dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("sheet_backup_{}.json", timestamp));

    let json = serde_json::to_string_pretty(records)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&path, json)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();

        let mut fields = HashMap::new();
        fields.insert("Title".to_string(), "Dune".to_string());
        let records = vec![BookRecord::new(2, fields)];

        let path = snapshot_records(&records, dir.path()).unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("sheet_backup_"));

        let restored: Vec<BookRecord> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].row_index, 2);
        assert_eq!(restored[0].get("Title"), "Dune");
    }

    #[test]
    fn snapshot_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("backups");

        let path = snapshot_records(&[], &nested).unwrap();
        assert!(path.exists());
    }
}
