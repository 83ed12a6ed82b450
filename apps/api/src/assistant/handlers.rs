use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assistant::{answer_question, improve_template, suggest_optimizations, suggest_template};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HelpRequest {
    pub question: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImproveTemplateRequest {
    /// Falls back to the saved manual template when absent or blank.
    pub template: Option<String>,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    pub success: bool,
    pub template: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub success: bool,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub success: bool,
    pub suggestion: String,
}

/// POST /api/assistant/suggest-template
pub async fn handle_suggest_template(
    State(state): State<AppState>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template = suggest_template(&state).await?;
    Ok(Json(TemplateResponse {
        success: true,
        template,
    }))
}

/// POST /api/assistant/improve-template
pub async fn handle_improve_template(
    State(state): State<AppState>,
    Json(request): Json<ImproveTemplateRequest>,
) -> Result<Json<TemplateResponse>, AppError> {
    let template =
        improve_template(&state, request.template.as_deref(), &request.feedback).await?;
    Ok(Json(TemplateResponse {
        success: true,
        template,
    }))
}

/// POST /api/assistant/help
pub async fn handle_help(
    State(state): State<AppState>,
    Json(request): Json<HelpRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let answer = answer_question(&state, &request.question).await?;
    Ok(Json(AnswerResponse {
        success: true,
        answer,
    }))
}

/// POST /api/assistant/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
) -> Result<Json<SuggestionResponse>, AppError> {
    let suggestion = suggest_optimizations(&state).await?;
    Ok(Json(SuggestionResponse {
        success: true,
        suggestion,
    }))
}
