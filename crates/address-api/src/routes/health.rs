use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    uptime_secs: i64,
    addresses: i64,
}

/// Liveness check that also round-trips to the database
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let addresses = state
        .store
        .count()
        .await
        .map_err(|e| AppError::Unavailable(e.to_string()))?;

    Ok(Json(HealthResponse {
        status: "ok",
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        addresses,
    }))
}
