//! Dataset identity and on-disk layout.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The four remotely-sourced datasets managed by the sync pipeline.
///
/// The pointer manifest resolves logical dataset names to download URLs and
/// is itself fetched as a dataset; the other three are resolved through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Pointer,
    Bands,
    Schedule,
    Descriptions,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Pointer,
        DatasetKind::Bands,
        DatasetKind::Schedule,
        DatasetKind::Descriptions,
    ];

    /// Stable key used by the fingerprint cache.
    pub fn key(&self) -> &'static str {
        match self {
            DatasetKind::Pointer => "pointer",
            DatasetKind::Bands => "bands",
            DatasetKind::Schedule => "schedule",
            DatasetKind::Descriptions => "descriptions",
        }
    }

    /// File name of the promoted canonical copy.
    pub fn file_name(&self) -> &'static str {
        match self {
            DatasetKind::Pointer => "pointer.txt",
            DatasetKind::Bands => "bands.csv",
            DatasetKind::Schedule => "schedule.csv",
            DatasetKind::Descriptions => "descriptions.csv",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Resolves canonical and in-flight download paths under a data directory.
///
/// Downloads land next to the canonical file (same volume) so the promoting
/// rename is atomic.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    data_dir: PathBuf,
}

impl DatasetPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the promoted, reader-visible copy.
    pub fn canonical(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Path an in-flight download is written to before promotion.
    pub fn temp(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(format!("{}.download", kind.file_name()))
    }
}
