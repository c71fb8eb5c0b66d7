//! End-to-end refresh pipeline tests against an in-process fixture server.

use std::sync::Arc;
use std::time::Duration;

use guide_common::{DatasetKind, DatasetPaths, Ranking};
use sync_engine::{
    DatasetDownloader, FetchContext, RefreshConfig, RefreshCoordinator, RefreshTrigger,
    RemoteFetcher,
};
use sync_store::HashCache;
use tempfile::TempDir;
use test_utils::{fixtures, FixtureServer};

fn build(
    server: &FixtureServer,
    dir: &TempDir,
    configure: impl FnOnce(&mut RefreshConfig),
) -> (Arc<HashCache>, Arc<RefreshCoordinator>) {
    let mut config = RefreshConfig::new(server.url("/pointer.txt"));
    configure(&mut config);

    let cache = Arc::new(HashCache::open(&dir.path().join("state")).unwrap());
    let paths = DatasetPaths::new(dir.path().join("data"));
    std::fs::create_dir_all(paths.data_dir()).unwrap();
    let fetcher = RemoteFetcher::new(FetchContext::Interactive).unwrap();
    let downloader = DatasetDownloader::new(fetcher, Arc::clone(&cache), paths);
    (cache, RefreshCoordinator::new(config, downloader))
}

fn serve_defaults(server: &FixtureServer) {
    server.set_body("/pointer.txt", fixtures::pointer_manifest(&server.url("")));
    server.set_body("/bands.csv", fixtures::BANDS_CSV);
    server.set_body("/schedule.csv", fixtures::SCHEDULE_CSV);
    server.set_body("/descriptions.csv", fixtures::DESCRIPTIONS_CSV);
}

#[tokio::test]
async fn test_end_to_end_refresh() {
    let server = FixtureServer::start().await;
    serve_defaults(&server);
    let dir = TempDir::new().unwrap();
    let (_, coordinator) = build(&server, &dir, |_| {});

    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.bands.get("Slayer").unwrap().ranking, Ranking::Must);
    assert_eq!(snapshot.bands.get("Tool").unwrap().ranking, Ranking::Might);
    assert_eq!(snapshot.schedule.entries("Slayer").count(), 2);
    assert_eq!(
        snapshot.descriptions.get("Tool"),
        Some("Prog metal veterans.")
    );
    assert!(snapshot.refreshed_at.is_some());

    // The direct accessors serve the same published structures.
    assert_eq!(coordinator.bands().len(), snapshot.bands.len());
    assert_eq!(coordinator.schedule().len(), snapshot.schedule.len());
    assert_eq!(coordinator.descriptions().len(), snapshot.descriptions.len());

    let outcome = coordinator.last_outcome().unwrap();
    assert_eq!(outcome.stages_completed, 4);
    assert!(outcome.error.is_none());
    assert!(!coordinator.is_refresh_in_progress());
}

#[tokio::test]
async fn test_rerun_with_identical_content_leaves_cache_untouched() {
    let server = FixtureServer::start().await;
    serve_defaults(&server);
    let dir = TempDir::new().unwrap();
    let (cache, coordinator) = build(&server, &dir, |c| {
        c.min_refresh_interval = Duration::ZERO;
    });

    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);
    let recorded = cache.get(DatasetKind::Bands).unwrap();

    // Byte-identical second run: nothing promotes, fingerprints unchanged,
    // parsed data still present.
    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);
    assert_eq!(cache.get(DatasetKind::Bands).unwrap(), recorded);
    assert_eq!(coordinator.snapshot().bands.len(), 3);
    assert_eq!(server.hits("/bands.csv"), 2);
}

#[tokio::test]
async fn test_double_trigger_runs_one_pipeline() {
    let server = FixtureServer::start().await;
    serve_defaults(&server);
    let dir = TempDir::new().unwrap();
    let (_, coordinator) = build(&server, &dir, |_| {});

    let mut outcomes = coordinator.subscribe();

    // Two triggers inside one second: the guards collapse them to one cycle.
    let first = coordinator.start_refresh();
    let second = coordinator.start_refresh();
    assert_eq!(first, RefreshTrigger::Started);
    assert_ne!(second, RefreshTrigger::Started);

    let outcome = outcomes.recv().await.unwrap();
    assert_eq!(outcome.stages_completed, 4);
    assert_eq!(server.hits("/pointer.txt"), 1);
    assert_eq!(server.hits("/bands.csv"), 1);
}

#[tokio::test]
async fn test_band_outage_serves_last_known_good() {
    let server = FixtureServer::start().await;
    serve_defaults(&server);
    let dir = TempDir::new().unwrap();
    let (_, coordinator) = build(&server, &dir, |c| {
        c.min_refresh_interval = Duration::ZERO;
    });

    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);

    // Band feed goes down; the canonical file from the first run stands in.
    server.set_status("/bands.csv", 500);
    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);

    let outcome = coordinator.last_outcome().unwrap();
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stages_completed, 4);
    assert_eq!(
        coordinator.snapshot().bands.get("Slayer").unwrap().ranking,
        Ranking::Must
    );
}

#[tokio::test]
async fn test_band_outage_without_local_copy_stops_pipeline() {
    let server = FixtureServer::start().await;
    serve_defaults(&server);
    server.set_status("/bands.csv", 503);
    let dir = TempDir::new().unwrap();
    let (_, coordinator) = build(&server, &dir, |_| {});

    // The trigger itself never errors; the failure is recorded in the
    // outcome and later stages are skipped.
    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);

    let outcome = coordinator.last_outcome().unwrap();
    assert_eq!(outcome.stages_completed, 1);
    assert!(outcome.error.is_some());
    assert!(coordinator.snapshot().bands.is_empty());
    assert_eq!(server.hits("/descriptions.csv"), 0);
}

#[tokio::test]
async fn test_pointer_without_schedule_uses_default_url() {
    let server = FixtureServer::start().await;
    server.set_body(
        "/pointer.txt",
        fixtures::pointer_manifest_without_schedule(&server.url("")),
    );
    server.set_body("/bands.csv", fixtures::BANDS_CSV);
    server.set_body("/fallback-schedule.csv", fixtures::SCHEDULE_CSV);
    server.set_body("/descriptions.csv", fixtures::DESCRIPTIONS_CSV);

    let dir = TempDir::new().unwrap();
    let fallback = server.url("/fallback-schedule.csv");
    let (_, coordinator) = build(&server, &dir, |c| {
        c.default_schedule_url = Some(fallback);
    });

    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);

    let outcome = coordinator.last_outcome().unwrap();
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stages_completed, 4);
    assert_eq!(server.hits("/fallback-schedule.csv"), 1);
    assert_eq!(coordinator.snapshot().schedule.entries("Tool").count(), 1);
}

#[tokio::test]
async fn test_pointer_outage_with_cached_manifest_continues() {
    let server = FixtureServer::start().await;
    serve_defaults(&server);
    let dir = TempDir::new().unwrap();
    let (_, coordinator) = build(&server, &dir, |c| {
        c.min_refresh_interval = Duration::ZERO;
    });

    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);

    server.set_status("/pointer.txt", 500);
    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);

    let outcome = coordinator.last_outcome().unwrap();
    assert!(outcome.error.is_none());
    assert_eq!(outcome.stages_completed, 4);
}

#[tokio::test]
async fn test_pointer_outage_cold_start_aborts_cycle() {
    let server = FixtureServer::start().await;
    server.set_status("/pointer.txt", 500);
    let dir = TempDir::new().unwrap();
    let (_, coordinator) = build(&server, &dir, |_| {});

    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);

    let outcome = coordinator.last_outcome().unwrap();
    assert_eq!(outcome.stages_completed, 0);
    assert!(outcome.error.is_some());
    assert_eq!(server.hits("/bands.csv"), 0);
    assert!(coordinator.snapshot().bands.is_empty());
}

#[tokio::test]
async fn test_changed_feed_content_is_republished() {
    let server = FixtureServer::start().await;
    serve_defaults(&server);
    let dir = TempDir::new().unwrap();
    let (_, coordinator) = build(&server, &dir, |c| {
        c.min_refresh_interval = Duration::ZERO;
    });

    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);
    assert_eq!(
        coordinator.snapshot().bands.get("Slayer").unwrap().ranking,
        Ranking::Must
    );

    server.set_body("/bands.csv", "name,rank\nSlayer,Wont\nTool,Might\n");
    assert_eq!(coordinator.refresh_and_wait().await, RefreshTrigger::Started);
    assert_eq!(
        coordinator.snapshot().bands.get("Slayer").unwrap().ranking,
        Ranking::Wont
    );
}
