//! Persisted fingerprint cache for dataset change detection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use guide_common::DatasetKind;
use tracing::{debug, warn};

use crate::error::Result;
use crate::fsutil::atomic_write;
use crate::hasher::{hash_file, Fingerprint};

const CACHE_FILE: &str = "fingerprints.json";

/// Last-known content fingerprint per dataset, persisted as a single JSON
/// document written through the atomic-rename primitive.
///
/// Writes are last-writer-wins; the refresh pipeline's single-flight
/// guarantee means no two cycles ever race on the same key.
pub struct HashCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, Fingerprint>>,
}

impl HashCache {
    /// Open the cache under `state_dir`, creating the directory if needed.
    ///
    /// A corrupt cache file is discarded with a warning; every dataset is
    /// then treated as changed on its next check, which only costs a
    /// re-parse.
    pub fn open(state_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_dir)?;
        let path = state_dir.join(CACHE_FILE);
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding corrupt fingerprint cache");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Last recorded fingerprint for a dataset, if any.
    pub fn get(&self, kind: DatasetKind) -> Option<Fingerprint> {
        self.lock().get(kind.key()).cloned()
    }

    /// Record a fingerprint and persist synchronously.
    pub fn set(&self, kind: DatasetKind, fingerprint: Fingerprint) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(kind.key().to_string(), fingerprint);
        self.persist(&entries)
    }

    /// Whether the file at `path` differs from the last recorded fingerprint
    /// for `kind`.
    ///
    /// Returns `true` when hashing fails (fail-open: re-processing a file is
    /// cheap, skipping a real change is not), when no prior fingerprint
    /// exists, or when the fingerprints differ. No side effects.
    pub fn has_changed(&self, path: &Path, kind: DatasetKind) -> bool {
        let current = match hash_file(path) {
            Ok(fp) => fp,
            Err(e) => {
                warn!(dataset = %kind, path = %path.display(), error = %e,
                      "Hashing failed, assuming content changed");
                return true;
            }
        };
        match self.get(kind) {
            None => true,
            Some(previous) => previous != current,
        }
    }

    /// Forget one dataset's fingerprint, forcing its next check to report
    /// changed.
    pub fn clear(&self, kind: DatasetKind) -> Result<()> {
        let mut entries = self.lock();
        if entries.remove(kind.key()).is_some() {
            debug!(dataset = %kind, "Cleared fingerprint");
            self.persist(&entries)?;
        }
        Ok(())
    }

    /// Forget every fingerprint.
    pub fn clear_all(&self) -> Result<()> {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Fingerprint>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &HashMap<String, Fingerprint>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        atomic_write(&self.path, json.as_bytes())?;
        Ok(())
    }
}
