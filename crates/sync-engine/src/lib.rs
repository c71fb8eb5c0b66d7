//! Offline-first refresh engine for the festival guide.
//!
//! Wires the parsing and persistence crates to the network: a streaming
//! fetcher with context-dependent timeouts, the shared per-dataset download
//! protocol (fetch, atomically promote, parse), and the single-flight
//! refresh coordinator that runs the pointer -> bands -> schedule ->
//! descriptions pipeline and publishes immutable snapshots to observers.

pub mod coordinator;
pub mod datasets;
pub mod error;
pub mod fetcher;

pub use coordinator::{
    GuideSnapshot, RefreshConfig, RefreshCoordinator, RefreshOutcome, RefreshTrigger,
};
pub use datasets::DatasetDownloader;
pub use error::SyncError;
pub use fetcher::{FetchContext, RemoteFetcher};
