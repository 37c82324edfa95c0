use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::StatusChange;
use crate::state::AppState;
use crate::tracking::retention::SweepReport;
use crate::tracking::scheduler::TickOutcome;

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SweepResponse {
    Completed(SweepReport),
    Skipped,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightHistoryResponse {
    pub flight_id: Uuid,
    pub history: Vec<StatusChange>,
}

/// POST /api/v1/tracker/run
pub async fn handle_run_tick(State(state): State<AppState>) -> Json<TickOutcome> {
    Json(state.scheduler.tick().await)
}

/// POST /api/v1/retention/run
pub async fn handle_run_sweep(
    State(state): State<AppState>,
) -> Result<Json<SweepResponse>, AppError> {
    let response = match state.sweeper.sweep(Utc::now()).await? {
        Some(report) => SweepResponse::Completed(report),
        None => SweepResponse::Skipped,
    };
    Ok(Json(response))
}

/// GET /api/v1/flights/:id/history
pub async fn handle_flight_history(
    State(state): State<AppState>,
    Path(flight_id): Path<Uuid>,
) -> Result<Json<FlightHistoryResponse>, AppError> {
    let history = state.store.status_history(flight_id).await?;
    Ok(Json(FlightHistoryResponse { flight_id, history }))
}
