use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::settings::GenerationSettings;
use crate::state::AppState;

/// GET /api/settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<GenerationSettings> {
    Json(state.settings.get().await)
}

/// PUT /api/settings
pub async fn handle_update_settings(
    State(state): State<AppState>,
    Json(settings): Json<GenerationSettings>,
) -> Result<Json<GenerationSettings>, AppError> {
    Ok(Json(state.settings.update(settings).await?))
}
