//! Service configuration loaded from YAML.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Root configuration for the sync daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// URL of the pointer manifest. The only mandatory setting.
    pub pointer_url: String,

    /// Used when the pointer omits a schedule URL.
    #[serde(default)]
    pub default_schedule_url: Option<String>,

    /// Shortest allowed gap between accepted refresh triggers, in seconds.
    #[serde(default = "default_min_refresh_interval_secs")]
    pub min_refresh_interval_secs: u64,

    /// Gap between scheduled background refreshes, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_min_refresh_interval_secs() -> u64 {
    5
}

fn default_poll_interval_secs() -> u64 {
    900
}

impl SyncConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: SyncConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(pointer_url = %config.pointer_url, "Loaded sync configuration");
        Ok(config)
    }

    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.min_refresh_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
