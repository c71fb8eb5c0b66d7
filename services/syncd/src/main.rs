//! Festival-guide sync daemon.
//!
//! Keeps the local dataset cache in step with the remote feed:
//! - force-fetches the pointer manifest each cycle to resolve dataset URLs
//! - downloads band/schedule/description CSVs through content-hash change
//!   detection and atomic promotion
//! - publishes parsed snapshots and completion events to observers
//! - HTTP status API for monitoring, manual triggers, and rankings

mod config;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use guide_common::DatasetPaths;
use sync_engine::{
    DatasetDownloader, FetchContext, RefreshConfig, RefreshCoordinator, RefreshTrigger,
    RemoteFetcher,
};
use sync_store::{HashCache, RankingStore};
use tokio::sync::broadcast;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::SyncConfig;
use server::ServerState;

#[derive(Parser, Debug)]
#[command(name = "syncd")]
#[command(about = "Festival-guide dataset synchronizer")]
struct Args {
    /// Configuration file
    #[arg(long, env = "SYNC_CONFIG", default_value = "config/sync.yaml")]
    config: PathBuf,

    /// Run one refresh cycle and exit (vs continuous polling)
    #[arg(long)]
    once: bool,

    /// Directory for canonical dataset files
    #[arg(long, env = "DATA_DIR", default_value = "data/guide")]
    data_dir: PathBuf,

    /// Directory for the fingerprint cache and ranking store
    #[arg(long, env = "STATE_DIR", default_value = "data/state")]
    state_dir: PathBuf,

    /// Port for the status HTTP server
    #[arg(long, env = "STATUS_PORT", default_value = "8084")]
    status_port: u16,

    /// Disable the status HTTP server
    #[arg(long)]
    no_status_server: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting festival-guide sync daemon");

    let sync_config = SyncConfig::load(&args.config)?;

    tokio::fs::create_dir_all(&args.data_dir).await?;
    tokio::fs::create_dir_all(&args.state_dir).await?;

    let cache = Arc::new(HashCache::open(&args.state_dir)?);
    let rankings = Arc::new(RankingStore::open(&args.state_dir)?);
    let paths = DatasetPaths::new(&args.data_dir);

    // One-shot runs are user-initiated; the polling daemon is background.
    let context = if args.once {
        FetchContext::Interactive
    } else {
        FetchContext::Background
    };
    let fetcher = RemoteFetcher::new(context)?;
    let downloader = DatasetDownloader::new(fetcher, cache, paths);

    let refresh_config = RefreshConfig {
        pointer_url: sync_config.pointer_url.clone(),
        default_schedule_url: sync_config.default_schedule_url.clone(),
        min_refresh_interval: sync_config.min_refresh_interval(),
    };
    let coordinator = RefreshCoordinator::new(refresh_config, downloader);

    if args.once {
        info!("Running single refresh cycle");
        coordinator.refresh_and_wait().await;
        report(&coordinator);
        return Ok(());
    }

    // Start status server (unless disabled)
    if !args.no_status_server {
        let state = Arc::new(ServerState {
            coordinator: Arc::clone(&coordinator),
            rankings,
        });
        let port = args.status_port;
        tokio::spawn(async move {
            if let Err(e) = server::run_server(state, port).await {
                tracing::error!(error = %e, "Status server failed");
            }
        });
    }

    // Shutdown on ctrl-c
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx.send(()).ok();
    });

    info!(
        poll_interval_secs = sync_config.poll_interval_secs,
        "Starting continuous polling"
    );
    let mut interval = tokio::time::interval(sync_config.poll_interval());
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let trigger = coordinator.start_refresh();
                if trigger != RefreshTrigger::Started {
                    warn!(trigger = trigger.as_str(), "Scheduled refresh dropped");
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutting down");
                break;
            }
        }
    }

    report(&coordinator);
    Ok(())
}

fn report(coordinator: &RefreshCoordinator) {
    let snapshot = coordinator.snapshot();
    info!(
        bands = snapshot.bands.len(),
        events = snapshot.schedule.len(),
        descriptions = snapshot.descriptions.len(),
        "Sync session complete"
    );
}
