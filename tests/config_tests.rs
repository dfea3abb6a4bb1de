//! Configuration loading and token resolution tests
//!
//! Tests that manipulate the process environment are marked #[serial]
//! to avoid racing each other.

use serial_test::serial;

use bookmend::config::{resolve_sheets_token, Config, TOKEN_ENV_VAR};
use bookmend::types::MetadataField;

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();

    assert_eq!(config.retry_attempts, 5);
    assert_eq!(config.backoff_factor, 1.0);
    assert_eq!(config.rate_limit_delay_ms, 1000);
    assert_eq!(config.max_workers, 3);
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.sheet_name, "Books");
    assert!(config.backup_enabled);
}

#[test]
fn default_field_mapping_is_ordered() {
    let mapping = Config::default().field_mapping().unwrap();

    assert_eq!(mapping.len(), 9);
    let entries = mapping.entries();
    assert_eq!(entries[0], ("Title".to_string(), MetadataField::Title));
    assert_eq!(entries[1], ("Author".to_string(), MetadataField::Authors));
    assert_eq!(entries[2], ("Genre".to_string(), MetadataField::Categories));
    assert_eq!(entries[5], ("ISBN".to_string(), MetadataField::Isbn));
    assert_eq!(entries[8], (
        "Description".to_string(),
        MetadataField::Description
    ));
}

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmend.toml");

    let config = Config::load(&path).unwrap();
    assert!(path.exists());
    assert_eq!(config.batch_size, 10);

    // The written file parses back to the same values
    let reloaded = Config::load(&path).unwrap();
    assert_eq!(reloaded.batch_size, config.batch_size);
    assert_eq!(reloaded.field_mapping, config.field_mapping);
}

#[test]
fn partial_toml_keeps_defaults_for_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmend.toml");
    std::fs::write(
        &path,
        r#"
spreadsheet_id = "abc123"
batch_size = 25
max_workers = 5
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.spreadsheet_id, "abc123");
    assert_eq!(config.batch_size, 25);
    assert_eq!(config.max_workers, 5);
    assert_eq!(config.retry_attempts, 5);
    assert_eq!(config.sheet_name, "Books");
}

#[test]
fn unknown_metadata_field_is_a_config_error() {
    let config = Config {
        field_mapping: vec![("Pages".to_string(), "pages".to_string())],
        ..Default::default()
    };

    assert!(config.field_mapping().is_err());
}

#[test]
fn malformed_toml_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmend.toml");
    std::fs::write(&path, "batch_size = \"ten\"").unwrap();

    assert!(Config::load(&path).is_err());
}

#[test]
#[serial]
fn env_token_takes_priority_over_toml() {
    std::env::set_var(TOKEN_ENV_VAR, "env-token");

    let config = Config {
        sheets_token: Some("toml-token".to_string()),
        ..Default::default()
    };
    let token = resolve_sheets_token(&config).unwrap();

    std::env::remove_var(TOKEN_ENV_VAR);
    assert_eq!(token, "env-token");
}

#[test]
#[serial]
fn toml_token_used_when_env_absent() {
    std::env::remove_var(TOKEN_ENV_VAR);

    let config = Config {
        sheets_token: Some("toml-token".to_string()),
        ..Default::default()
    };

    assert_eq!(resolve_sheets_token(&config).unwrap(), "toml-token");
}

#[test]
#[serial]
fn missing_token_is_an_error() {
    std::env::remove_var(TOKEN_ENV_VAR);

    let config = Config::default();
    assert!(resolve_sheets_token(&config).is_err());
}

#[test]
#[serial]
fn blank_env_token_is_ignored() {
    std::env::set_var(TOKEN_ENV_VAR, "   ");

    let config = Config {
        sheets_token: Some("toml-token".to_string()),
        ..Default::default()
    };
    let token = resolve_sheets_token(&config).unwrap();

    std::env::remove_var(TOKEN_ENV_VAR);
    assert_eq!(token, "toml-token");
}
