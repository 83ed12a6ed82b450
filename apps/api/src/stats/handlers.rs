use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::stats::StatsSnapshot;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
}

/// GET /api/stats
///
/// Served from memory. `stale` is set when the last write to disk failed.
pub async fn handle_get_stats(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot().await)
}

/// POST /api/stats/reset
pub async fn handle_reset_stats(
    State(state): State<AppState>,
) -> Result<Json<ResetResponse>, AppError> {
    state.stats.reset().await?;
    Ok(Json(ResetResponse {
        success: true,
        message: "Statistics reset".to_string(),
    }))
}
