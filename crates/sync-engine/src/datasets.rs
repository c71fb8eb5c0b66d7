//! Shared dataset download protocol: fetch, promote, parse.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use band_data::{BandList, DescriptionMap, PointerManifest, ScheduleIndex};
use guide_common::{DatasetKind, DatasetPaths};
use sync_store::{promote_if_changed, HashCache, Promotion};
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::fetcher::RemoteFetcher;

/// Downloads the four datasets through one protocol.
///
/// Every dataset goes through the same steps: stream the URL into a temp
/// file, atomically promote it when its content fingerprint changed, then
/// parse the canonical file regardless of the promotion outcome. Parsing
/// unconditionally keeps the in-memory structure warm even when this
/// process's fingerprint cache was cold but the file on disk was already
/// current from a prior run.
pub struct DatasetDownloader {
    fetcher: RemoteFetcher,
    cache: Arc<HashCache>,
    paths: DatasetPaths,
}

impl DatasetDownloader {
    pub fn new(fetcher: RemoteFetcher, cache: Arc<HashCache>, paths: DatasetPaths) -> Self {
        Self {
            fetcher,
            cache,
            paths,
        }
    }

    pub fn paths(&self) -> &DatasetPaths {
        &self.paths
    }

    /// Fetch and promote one dataset, returning the canonical path to parse.
    ///
    /// A failed fetch falls back to the existing canonical file when one is
    /// present: stale data beats no data. With no canonical copy either, the
    /// fetch error propagates.
    async fn sync_file(&self, kind: DatasetKind, url: &str) -> Result<PathBuf, SyncError> {
        let temp = self.paths.temp(kind);
        let canonical = self.paths.canonical(kind);

        match self.fetcher.fetch(url, &temp).await {
            Ok(_) => {
                match promote_if_changed(&self.cache, &temp, &canonical, kind)? {
                    Promotion::Changed => debug!(dataset = %kind, "Dataset updated"),
                    Promotion::Unchanged => debug!(dataset = %kind, "Dataset unchanged"),
                }
                Ok(canonical)
            }
            Err(e) if canonical.exists() => {
                warn!(dataset = %kind, error = %e, "Fetch failed, using last-known-good copy");
                Ok(canonical)
            }
            Err(e) => {
                warn!(dataset = %kind, error = %e, "Fetch failed with no local fallback");
                Err(e)
            }
        }
    }

    async fn read(&self, path: &Path) -> Result<String, SyncError> {
        Ok(tokio::fs::read_to_string(path).await?)
    }

    /// Fetch and parse the pointer manifest.
    pub async fn pointer(&self, url: &str) -> Result<PointerManifest, SyncError> {
        let path = self.sync_file(DatasetKind::Pointer, url).await?;
        Ok(PointerManifest::parse(&self.read(&path).await?)?)
    }

    /// Fetch and parse the band list.
    pub async fn bands(&self, url: &str) -> Result<BandList, SyncError> {
        let path = self.sync_file(DatasetKind::Bands, url).await?;
        Ok(BandList::parse(&self.read(&path).await?)?)
    }

    /// Fetch and parse the schedule into its per-band index.
    pub async fn schedule(&self, url: &str) -> Result<ScheduleIndex, SyncError> {
        let path = self.sync_file(DatasetKind::Schedule, url).await?;
        Ok(ScheduleIndex::parse(&self.read(&path).await?)?)
    }

    /// Fetch and parse the description map.
    pub async fn descriptions(&self, url: &str) -> Result<DescriptionMap, SyncError> {
        let path = self.sync_file(DatasetKind::Descriptions, url).await?;
        Ok(DescriptionMap::parse(&self.read(&path).await?))
    }
}
