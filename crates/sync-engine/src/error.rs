//! Error types for the sync engine.

use thiserror::Error;

/// Errors that can occur while refreshing datasets.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP status {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Pointer manifest has no {0} URL")]
    MissingDatasetUrl(&'static str),

    #[error(transparent)]
    Store(#[from] sync_store::StoreError),

    #[error(transparent)]
    Parse(#[from] band_data::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
