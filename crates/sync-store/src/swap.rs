//! Atomic promotion of downloaded files into their canonical paths.

use std::fs;
use std::path::Path;

use guide_common::DatasetKind;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::hash_cache::HashCache;
use crate::hasher::hash_file;

/// Outcome of a promotion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// The temp file replaced the canonical file and the fingerprint cache
    /// was updated.
    Changed,
    /// The temp file matched the recorded fingerprint and was discarded; the
    /// canonical file and cache are untouched.
    Unchanged,
}

/// Promote `temp` to `canonical` only when its content fingerprint differs
/// from the last recorded one for `kind`.
///
/// The rename is atomic on the same volume, so readers of `canonical` only
/// ever see the prior complete file or the new complete file. A failed
/// rename leaves the prior canonical content and the fingerprint cache
/// unmodified.
pub fn promote_if_changed(
    cache: &HashCache,
    temp: &Path,
    canonical: &Path,
    kind: DatasetKind,
) -> Result<Promotion> {
    if !temp.exists() {
        return Err(StoreError::TempMissing(temp.to_path_buf()));
    }

    if !cache.has_changed(temp, kind) {
        fs::remove_file(temp)?;
        debug!(dataset = %kind, "Content unchanged, discarding download");
        return Ok(Promotion::Unchanged);
    }

    fs::rename(temp, canonical)?;

    // Fingerprint the promoted file itself, not the temp copy, so the cache
    // always describes what is actually on disk.
    let fingerprint = hash_file(canonical)?;
    cache.set(kind, fingerprint)?;

    info!(dataset = %kind, path = %canonical.display(), "Promoted new canonical file");
    Ok(Promotion::Changed)
}
