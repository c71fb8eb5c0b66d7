//! Local persistence for the festival-guide sync pipeline.
//!
//! Everything here is plain files under a state/data directory:
//!
//! - streaming SHA-256 fingerprints for change detection
//! - a persisted fingerprint cache, one entry per dataset
//! - atomic promotion of downloaded files into their canonical paths
//! - the per-band attendance ranking store
//!
//! All writes go through write-to-temp-then-rename, so readers only ever
//! observe a prior-complete or new-complete file.

pub mod error;
mod fsutil;
pub mod hash_cache;
pub mod hasher;
pub mod rankings;
pub mod swap;

pub use error::{Result, StoreError};
pub use hash_cache::HashCache;
pub use hasher::{hash_bytes, hash_file, Fingerprint};
pub use rankings::RankingStore;
pub use swap::{promote_if_changed, Promotion};
