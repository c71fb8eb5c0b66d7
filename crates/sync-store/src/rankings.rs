//! Persisted per-band attendance rankings.
//!
//! One JSON document (band name -> ranking) written through the
//! atomic-rename primitive, so a crash mid-write leaves the prior complete
//! file rather than a torn one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use guide_common::Ranking;
use tracing::warn;

use crate::error::Result;
use crate::fsutil::atomic_write;

const RANKINGS_FILE: &str = "rankings.json";

pub struct RankingStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, Ranking>>,
}

impl RankingStore {
    /// Open the store under `state_dir`, creating the directory if needed.
    pub fn open(state_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_dir)?;
        let path = state_dir.join(RANKINGS_FILE);
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding corrupt ranking store");
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

    /// Ranking for a band; `Unknown` when none was ever recorded.
    pub fn get(&self, band: &str) -> Ranking {
        self.lock().get(band).copied().unwrap_or_default()
    }

    /// Record a ranking and persist synchronously.
    pub fn set(&self, band: &str, ranking: Ranking) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(band.to_string(), ranking);
        self.persist(&entries)
    }

    /// Drop a band's ranking.
    pub fn remove(&self, band: &str) -> Result<()> {
        let mut entries = self.lock();
        if entries.remove(band).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    /// Snapshot of every recorded ranking.
    pub fn all(&self) -> HashMap<String, Ranking> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Ranking>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, entries: &HashMap<String, Ranking>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        atomic_write(&self.path, json.as_bytes())?;
        Ok(())
    }
}
