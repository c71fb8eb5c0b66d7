//! HTTP server for sync status, manual triggers, and rankings.
//!
//! Endpoints:
//! - `GET /health` liveness probe
//! - `GET /status` refresh state and snapshot counts
//! - `POST /refresh` manual refresh trigger
//! - `GET /rankings` / `POST /rankings` the per-band attendance store

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use guide_common::Ranking;
use serde::{Deserialize, Serialize};
use sync_engine::{RefreshCoordinator, RefreshOutcome, RefreshTrigger};
use sync_store::RankingStore;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared state handed to every handler.
pub struct ServerState {
    pub coordinator: Arc<RefreshCoordinator>,
    pub rankings: Arc<RankingStore>,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub refresh_in_progress: bool,
    pub band_count: usize,
    pub event_count: usize,
    pub description_count: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_outcome: Option<RefreshOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerResponse {
    pub trigger: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RankingRequest {
    pub band: String,
    pub ranking: Ranking,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingResponse {
    pub band: String,
    pub ranking: Ranking,
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "syncd",
    })
}

async fn status(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    let snapshot = state.coordinator.snapshot();
    Json(StatusResponse {
        service: "syncd",
        refresh_in_progress: state.coordinator.is_refresh_in_progress(),
        band_count: snapshot.bands.len(),
        event_count: snapshot.schedule.len(),
        description_count: snapshot.descriptions.len(),
        refreshed_at: snapshot.refreshed_at,
        last_outcome: state.coordinator.last_outcome(),
    })
}

async fn trigger_refresh(
    State(state): State<Arc<ServerState>>,
) -> (StatusCode, Json<TriggerResponse>) {
    let trigger = state.coordinator.start_refresh();
    let code = match trigger {
        RefreshTrigger::Started => StatusCode::ACCEPTED,
        _ => StatusCode::OK,
    };
    (code, Json(TriggerResponse {
        trigger: trigger.as_str(),
    }))
}

async fn list_rankings(
    State(state): State<Arc<ServerState>>,
) -> Json<std::collections::HashMap<String, Ranking>> {
    Json(state.rankings.all())
}

async fn set_ranking(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<RankingRequest>,
) -> Result<Json<RankingResponse>, (StatusCode, String)> {
    state
        .rankings
        .set(&request.band, request.ranking)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(RankingResponse {
        band: request.band,
        ranking: request.ranking,
    }))
}

// ============================================================================
// Server
// ============================================================================

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/refresh", post(trigger_refresh))
        .route("/rankings", get(list_rankings).post(set_ranking))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

pub async fn run_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "Starting status server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_serialization() {
        let response = StatusResponse {
            service: "syncd",
            refresh_in_progress: false,
            band_count: 120,
            event_count: 340,
            description_count: 118,
            refreshed_at: None,
            last_outcome: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"band_count\":120"));
        assert!(json.contains("\"refresh_in_progress\":false"));
    }

    #[test]
    fn test_ranking_request_deserialization() {
        let request: RankingRequest =
            serde_json::from_str(r#"{"band": "Slayer", "ranking": "must"}"#).unwrap();
        assert_eq!(request.band, "Slayer");
        assert_eq!(request.ranking, Ranking::Must);
    }

    #[test]
    fn test_trigger_response_serialization() {
        let json = serde_json::to_string(&TriggerResponse { trigger: "started" }).unwrap();
        assert_eq!(json, r#"{"trigger":"started"}"#);
    }
}
