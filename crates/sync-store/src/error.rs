//! Error types for the store crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in local persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Downloaded temp file missing: {0}")]
    TempMissing(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
