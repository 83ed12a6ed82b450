use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::history::HistoryEntry;
use crate::state::AppState;
use crate::stats::SendStatus;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// One of `success`, `error` or `pending`.
    pub status: Option<String>,
}

/// GET /api/history
pub async fn handle_list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let entries = match params.status.as_deref().map(str::trim) {
        None | Some("") => state.history.entries().await,
        Some(raw) => {
            let status: SendStatus = raw.parse()?;
            state.history.entries_with_status(status).await
        }
    };
    Ok(Json(entries))
}
