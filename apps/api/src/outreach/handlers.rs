use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::outreach::{draft_application, send_application, Draft, SendOutcome, SendRequest};
use crate::state::AppState;

/// POST /api/outreach/draft
pub async fn handle_draft(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<Json<Draft>, AppError> {
    Ok(Json(draft_application(&state, request).await?))
}

/// POST /api/outreach/send
///
/// Delivery and composition failures still return 200; see `status` in the body.
pub async fn handle_send(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Result<Json<SendOutcome>, AppError> {
    Ok(Json(send_application(&state, request).await?))
}
