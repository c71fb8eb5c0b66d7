//! Atomic file write helper.

use std::fs;
use std::path::Path;

/// Write to a sibling temp file, then rename over the destination.
///
/// The destination only ever holds the prior complete content or the new
/// complete content; a crash mid-write leaves the old file intact.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let temp = path.with_extension("tmp");
    fs::write(&temp, data)?;
    fs::rename(&temp, path)?;
    Ok(())
}
