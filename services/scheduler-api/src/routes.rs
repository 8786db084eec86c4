use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use scheduler_core::BufferId;

use crate::engine::Command;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/seed", post(seed))
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/reset", post(reset))
        .route("/metrics", get(metrics))
        .route("/buffers", get(buffers))
        .route("/buffers/:id", get(buffer))
        .route("/buffers/:id/maintenance", post(set_maintenance))
        .route("/status", get(status))
        .route("/report", get(report))
}

#[derive(Debug, Deserialize)]
pub struct SeedRequest {
    #[serde(default = "default_seed_count")]
    pub count: u32,
}

fn default_seed_count() -> u32 {
    900
}

async fn seed(State(state): State<AppState>, Json(req): Json<SeedRequest>) -> StatusCode {
    state.engine.send(Command::Seed(req.count));
    StatusCode::ACCEPTED
}

async fn start(State(state): State<AppState>) -> StatusCode {
    state.engine.send(Command::Start);
    StatusCode::ACCEPTED
}

async fn stop(State(state): State<AppState>) -> StatusCode {
    state.engine.send(Command::Stop);
    StatusCode::ACCEPTED
}

async fn reset(State(state): State<AppState>) -> (StatusCode, String) {
    match state.engine.reset().await {
        Some(Ok(())) => (StatusCode::ACCEPTED, String::new()),
        Some(Err(err)) => (StatusCode::CONFLICT, err.to_string()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "engine unavailable".to_string()),
    }
}

async fn metrics(State(state): State<AppState>) -> Result<Json<scheduler_core::MetricsSnapshot>, StatusCode> {
    state.engine.snapshot().await.map(Json).ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

async fn report(State(state): State<AppState>) -> Result<Json<scheduler_core::ReportPayload>, StatusCode> {
    state.engine.report().await.map(Json).ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

async fn buffers(State(state): State<AppState>) -> Result<Json<scheduler_core::MetricsSnapshot>, StatusCode> {
    // Buffer states ride along on the metrics snapshot rather than a second round trip
    // through the engine; `buffer_states` is the field callers actually want here.
    state.engine.snapshot().await.map(Json).ok_or(StatusCode::SERVICE_UNAVAILABLE)
}

async fn buffer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<scheduler_core::BufferLane>, (StatusCode, String)> {
    let buffer_id: BufferId = id.parse().map_err(|_| (StatusCode::NOT_FOUND, format!("unknown buffer {id}")))?;
    match state.engine.buffer_snapshot(buffer_id).await {
        Some(Ok(lane)) => Ok(Json(lane)),
        Some(Err(err)) => Err((StatusCode::NOT_FOUND, err.to_string())),
        None => Err((StatusCode::SERVICE_UNAVAILABLE, "engine unavailable".to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceRequest {
    pub is_available: bool,
}

async fn set_maintenance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MaintenanceRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let buffer_id: BufferId = id.parse().map_err(|_| (StatusCode::NOT_FOUND, format!("unknown buffer {id}")))?;
    state.engine.send(Command::SetMaintenance { buffer_id, is_available: req.is_available });
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    running: bool,
    current_tick: u64,
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    let snapshot = state.engine.snapshot().await.ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    Ok(Json(StatusResponse { running: snapshot.simulation_running, current_tick: snapshot.current_tick }))
}
