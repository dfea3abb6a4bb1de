//! Configuration loading and token resolution
//!
//! A TOML file with serde defaults; a missing file is written back with
//! the defaults so users have something to edit. The Sheets API token
//! resolves ENV → TOML (authentication itself, obtaining the token, is
//! the caller's problem).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::{FieldMapping, MetadataField};

pub const TOKEN_ENV_VAR: &str = "BOOKMEND_SHEETS_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Total HTTP attempts per request, including the first
    pub retry_attempts: u32,
    /// Initial retry backoff in seconds; doubles per retry
    pub backoff_factor: f64,
    /// Minimum spacing between calls to the same source
    pub rate_limit_delay_ms: u64,
    /// Concurrent fetch tasks per batch
    pub max_workers: usize,
    /// Records resolved per batch
    pub batch_size: usize,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub log_level: String,
    pub backup_enabled: bool,
    pub backup_dir: PathBuf,
    /// Sheets API bearer token; the environment variable takes priority
    pub sheets_token: Option<String>,
    /// Ordered (sheet column, metadata attribute) pairs eligible for
    /// auto-fill
    pub field_mapping: Vec<(String, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            retry_attempts: 5,
            backoff_factor: 1.0,
            rate_limit_delay_ms: 1000,
            max_workers: 3,
            batch_size: 10,
            spreadsheet_id: String::new(),
            sheet_name: "Books".to_string(),
            log_level: "info".to_string(),
            backup_enabled: true,
            backup_dir: PathBuf::from("backups"),
            sheets_token: None,
            field_mapping: default_field_mapping(),
        }
    }
}

fn default_field_mapping() -> Vec<(String, String)> {
    [
        ("Title", "title"),
        ("Author", "authors"),
        ("Genre", "categories"),
        ("Publisher", "publisher"),
        ("PublicationYear", "published_year"),
        ("ISBN", "isbn"),
        ("Pages", "page_count"),
        ("Language", "language"),
        ("Description", "description"),
    ]
    .into_iter()
    .map(|(sheet, attr)| (sheet.to_string(), attr.to_string()))
    .collect()
}

impl Config {
    /// Load configuration from `path`; when the file does not exist,
    /// write one out with the defaults and use those.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
        } else {
            let config = Self::default();
            let content = toml::to_string_pretty(&config)
                .map_err(|e| Error::Config(format!("Serialize defaults failed: {}", e)))?;
            std::fs::write(path, content)?;
            Ok(config)
        }
    }

    /// Parse the configured field mapping into its typed form.
    pub fn field_mapping(&self) -> Result<FieldMapping> {
        let mut entries = Vec::with_capacity(self.field_mapping.len());

        for (store_field, attr_name) in &self.field_mapping {
            let field = MetadataField::parse(attr_name).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown metadata field '{}' in field_mapping",
                    attr_name
                ))
            })?;
            entries.push((store_field.clone(), field));
        }

        Ok(FieldMapping::new(entries))
    }
}

/// Resolve the Sheets API token with ENV → TOML priority.
pub fn resolve_sheets_token(config: &Config) -> Result<String> {
    let env_token = std::env::var(TOKEN_ENV_VAR)
        .ok()
        .filter(|token| !token.trim().is_empty());
    let toml_token = config
        .sheets_token
        .as_ref()
        .filter(|token| !token.trim().is_empty());

    if env_token.is_some() && toml_token.is_some() {
        warn!(
            "Sheets API token found in multiple sources: environment, TOML. \
             Using environment (highest priority)."
        );
    }

    if let Some(token) = env_token {
        info!("Sheets API token loaded from environment variable");
        return Ok(token);
    }

    if let Some(token) = toml_token {
        info!("Sheets API token loaded from TOML config");
        return Ok(token.clone());
    }

    Err(Error::Config(format!(
        "Sheets API token not configured. Set {} or add sheets_token to the config file.",
        TOKEN_ENV_VAR
    )))
}
