//! Crate-level error types
//!
//! Fatal conditions only: connectivity, configuration, and store-level
//! failures abort the run. Per-source and per-row failures are contained
//! where they happen and surface as counters and log entries instead.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No network path available; checked once up front
    #[error("No internet connection available")]
    Connectivity,

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External store failure (authentication, missing sheet, API error)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
