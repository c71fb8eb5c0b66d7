//! Refresh orchestration: single-flight pipeline over the four datasets.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use band_data::{BandList, DescriptionMap, PointerManifest, ScheduleIndex};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, instrument};

use crate::datasets::DatasetDownloader;
use crate::error::SyncError;

/// Triggers closer together than this are dropped.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Immutable published view of the parsed datasets.
///
/// Rebuilt copy-on-publish each cycle; readers hold an `Arc` and never see a
/// partially updated set.
#[derive(Debug, Clone, Default)]
pub struct GuideSnapshot {
    pub bands: Arc<BandList>,
    pub schedule: Arc<ScheduleIndex>,
    pub descriptions: Arc<DescriptionMap>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Configuration for the refresh pipeline.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// URL of the pointer manifest, fetched fresh every cycle.
    pub pointer_url: String,
    /// Used when the pointer omits a schedule URL.
    pub default_schedule_url: Option<String>,
    pub min_refresh_interval: Duration,
}

impl RefreshConfig {
    pub fn new(pointer_url: impl Into<String>) -> Self {
        Self {
            pointer_url: pointer_url.into(),
            default_schedule_url: None,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
        }
    }
}

/// What happened to a refresh trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    Started,
    Throttled,
    AlreadyRunning,
}

impl RefreshTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTrigger::Started => "started",
            RefreshTrigger::Throttled => "throttled",
            RefreshTrigger::AlreadyRunning => "already_running",
        }
    }
}

/// Result of one completed refresh cycle, delivered to observers.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Stages that produced fresh data, out of four.
    pub stages_completed: usize,
    /// First stage error, if the cycle terminated early.
    pub error: Option<String>,
}

/// Compare-and-set refresh state: at most one cycle runs at a time, and
/// re-triggers inside the throttle window are dropped.
struct RefreshState {
    running: AtomicBool,
    anchor: Instant,
    /// Millis since `anchor` of the last accepted trigger; 0 = never.
    last_started_ms: AtomicU64,
    min_interval: Duration,
}

impl RefreshState {
    fn new(min_interval: Duration) -> Self {
        Self {
            running: AtomicBool::new(false),
            anchor: Instant::now(),
            last_started_ms: AtomicU64::new(0),
            min_interval,
        }
    }

    fn try_begin(&self) -> RefreshTrigger {
        let now_ms = self.anchor.elapsed().as_millis() as u64;
        let last_ms = self.last_started_ms.load(Ordering::Acquire);
        if last_ms != 0 && now_ms.saturating_sub(last_ms) < self.min_interval.as_millis() as u64 {
            return RefreshTrigger::Throttled;
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return RefreshTrigger::AlreadyRunning;
        }
        // Never store 0, it is the "never started" marker.
        self.last_started_ms.store(now_ms.max(1), Ordering::Release);
        RefreshTrigger::Started
    }

    fn finish(&self) {
        self.running.store(false, Ordering::Release);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Orchestrates the pointer -> bands -> schedule -> descriptions pipeline.
///
/// One instance per process. Triggers come from anywhere (lifecycle events,
/// user pull-to-refresh, push messages); the state guards collapse them into
/// at most one running cycle.
pub struct RefreshCoordinator {
    config: RefreshConfig,
    downloader: DatasetDownloader,
    state: RefreshState,
    published: watch::Sender<Arc<GuideSnapshot>>,
    events: broadcast::Sender<RefreshOutcome>,
    last_outcome: Mutex<Option<RefreshOutcome>>,
}

impl RefreshCoordinator {
    pub fn new(config: RefreshConfig, downloader: DatasetDownloader) -> Arc<Self> {
        let state = RefreshState::new(config.min_refresh_interval);
        let (published, _) = watch::channel(Arc::new(GuideSnapshot::default()));
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            config,
            downloader,
            state,
            published,
            events,
            last_outcome: Mutex::new(None),
        })
    }

    /// Trigger a refresh cycle, dispatched off the calling task.
    ///
    /// Dropped triggers (throttled or already running) are silent no-ops;
    /// the return value only reports what happened.
    pub fn start_refresh(self: &Arc<Self>) -> RefreshTrigger {
        let trigger = self.state.try_begin();
        match trigger {
            RefreshTrigger::Started => {
                let coordinator = Arc::clone(self);
                tokio::spawn(async move { coordinator.run_cycle().await });
            }
            _ => debug!(trigger = trigger.as_str(), "Refresh trigger dropped"),
        }
        trigger
    }

    /// Run one refresh cycle to completion on the current task.
    ///
    /// Same guards as [`start_refresh`](Self::start_refresh); for one-shot
    /// callers that want to await the result.
    pub async fn refresh_and_wait(&self) -> RefreshTrigger {
        let trigger = self.state.try_begin();
        if trigger == RefreshTrigger::Started {
            self.run_cycle().await;
        }
        trigger
    }

    pub fn is_refresh_in_progress(&self) -> bool {
        self.state.is_running()
    }

    /// Most recently published snapshot.
    pub fn snapshot(&self) -> Arc<GuideSnapshot> {
        self.published.borrow().clone()
    }

    /// Watch snapshot publications.
    pub fn watch(&self) -> watch::Receiver<Arc<GuideSnapshot>> {
        self.published.subscribe()
    }

    /// Most recently parsed band list.
    pub fn bands(&self) -> Arc<BandList> {
        self.published.borrow().bands.clone()
    }

    /// Most recently parsed schedule index.
    pub fn schedule(&self) -> Arc<ScheduleIndex> {
        self.published.borrow().schedule.clone()
    }

    /// Most recently parsed description map.
    pub fn descriptions(&self) -> Arc<DescriptionMap> {
        self.published.borrow().descriptions.clone()
    }

    /// Subscribe to cycle completions. Best-effort: outcomes sent while no
    /// receiver is alive are dropped, never queued.
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshOutcome> {
        self.events.subscribe()
    }

    pub fn last_outcome(&self) -> Option<RefreshOutcome> {
        self.last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[instrument(skip(self))]
    async fn run_cycle(&self) {
        let started_at = Utc::now();
        let (stages, failure) = self.run_pipeline().await;

        // Terminal step runs whatever happened above: flip back to idle,
        // record the outcome, notify observers.
        self.state.finish();
        let outcome = RefreshOutcome {
            started_at,
            finished_at: Utc::now(),
            stages_completed: stages,
            error: failure.map(|e| e.to_string()),
        };
        *self
            .last_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
        let _ = self.events.send(outcome);
    }

    async fn run_pipeline(&self) -> (usize, Option<SyncError>) {
        // The pointer is fetched from the network every cycle; its URLs
        // drive everything downstream. Only a pointer failure with no cached
        // manifest aborts before any stage runs.
        let manifest = match self.downloader.pointer(&self.config.pointer_url).await {
            Ok(manifest) => manifest,
            Err(e) => {
                error!(error = %e, "Pointer refresh failed, aborting cycle");
                return (0, Some(e));
            }
        };

        let mut fresh = StageResults::default();
        let failure = match self.run_stages(&manifest, &mut fresh).await {
            Ok(()) => None,
            Err(e) => {
                error!(error = %e, "Refresh stage failed, keeping previous data for remaining datasets");
                Some(e)
            }
        };
        let stages = 1 + fresh.completed();

        // Publish whatever succeeded over the previous snapshot; failed
        // stages keep their prior parsed structures.
        let previous = self.snapshot();
        let next = GuideSnapshot {
            bands: fresh.bands.unwrap_or_else(|| previous.bands.clone()),
            schedule: fresh.schedule.unwrap_or_else(|| previous.schedule.clone()),
            descriptions: fresh
                .descriptions
                .unwrap_or_else(|| previous.descriptions.clone()),
            refreshed_at: Some(Utc::now()),
        };
        self.published.send_replace(Arc::new(next));

        (stages, failure)
    }

    async fn run_stages(
        &self,
        manifest: &PointerManifest,
        out: &mut StageResults,
    ) -> Result<(), SyncError> {
        let bands_url = manifest
            .band_list()
            .ok_or(SyncError::MissingDatasetUrl("bandList"))?;
        out.bands = Some(Arc::new(self.downloader.bands(bands_url).await?));

        // The pointer may omit the schedule URL; the compiled-in default
        // keeps the stage alive.
        let schedule_url = manifest
            .schedule()
            .map(str::to_string)
            .or_else(|| self.config.default_schedule_url.clone())
            .ok_or(SyncError::MissingDatasetUrl("schedule"))?;
        out.schedule = Some(Arc::new(self.downloader.schedule(&schedule_url).await?));

        let descriptions_url = manifest
            .description_map()
            .ok_or(SyncError::MissingDatasetUrl("descriptionMap"))?;
        out.descriptions = Some(Arc::new(
            self.downloader.descriptions(descriptions_url).await?,
        ));

        Ok(())
    }
}

#[derive(Default)]
struct StageResults {
    bands: Option<Arc<BandList>>,
    schedule: Option<Arc<ScheduleIndex>>,
    descriptions: Option<Arc<DescriptionMap>>,
}

impl StageResults {
    fn completed(&self) -> usize {
        self.bands.is_some() as usize
            + self.schedule.is_some() as usize
            + self.descriptions.is_some() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_single_flight() {
        let state = RefreshState::new(Duration::from_millis(0));
        assert_eq!(state.try_begin(), RefreshTrigger::Started);
        assert!(state.is_running());
        assert_eq!(state.try_begin(), RefreshTrigger::AlreadyRunning);

        state.finish();
        assert!(!state.is_running());
        assert_eq!(state.try_begin(), RefreshTrigger::Started);
    }

    #[test]
    fn test_state_throttles_rapid_triggers() {
        let state = RefreshState::new(Duration::from_secs(5));
        assert_eq!(state.try_begin(), RefreshTrigger::Started);
        state.finish();
        // Inside the window the trigger is dropped even though nothing runs.
        assert_eq!(state.try_begin(), RefreshTrigger::Throttled);
        assert!(!state.is_running());
    }

    #[test]
    fn test_state_allows_trigger_after_window() {
        let state = RefreshState::new(Duration::from_millis(20));
        assert_eq!(state.try_begin(), RefreshTrigger::Started);
        state.finish();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(state.try_begin(), RefreshTrigger::Started);
    }

    #[test]
    fn test_trigger_labels() {
        assert_eq!(RefreshTrigger::Started.as_str(), "started");
        assert_eq!(RefreshTrigger::AlreadyRunning.as_str(), "already_running");
    }

    #[test]
    fn test_default_snapshot_is_empty() {
        let snapshot = GuideSnapshot::default();
        assert!(snapshot.bands.is_empty());
        assert!(snapshot.schedule.is_empty());
        assert!(snapshot.descriptions.is_empty());
        assert!(snapshot.refreshed_at.is_none());
    }
}
