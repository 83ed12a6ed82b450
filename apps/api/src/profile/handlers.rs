use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;
use crate::profile::extract::{analyze_resume, extract_resume_text};
use crate::profile::Profile;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct ResumeUploadResponse {
    pub filename: String,
    pub skills_found: usize,
    pub profile: Profile,
}

/// GET /api/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Result<Json<Profile>, AppError> {
    state
        .profiles
        .get()
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No profile yet, upload a résumé first".to_string()))
}

/// PUT /api/profile
pub async fn handle_replace_profile(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(state.profiles.replace(profile).await?))
}

/// POST /api/profile/resume
/// Stores the PDF as the current attachment, then extracts and saves the profile.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let (filename, pdf) = read_resume_field(&mut multipart).await?;
    if !filename.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("Only PDF files are accepted".to_string()));
    }
    if pdf.is_empty() {
        return Err(AppError::Validation("The uploaded file is empty".to_string()));
    }

    let stored = state.resumes.store(&filename, &pdf).await?;

    // PDF parsing is CPU-bound.
    let text = tokio::task::spawn_blocking(move || extract_resume_text(&pdf))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in résumé extraction: {e}"))
        })??;

    let settings = state.settings.get().await;
    let profile = analyze_resume(&text, state.generator.as_ref(), &settings).await?;
    let profile = state.profiles.replace(profile).await?;

    if let Err(e) = state.stats.record_cv_analysis().await {
        warn!("Résumé analyzed but stats not updated: {e}");
    }

    Ok(Json(ResumeUploadResponse {
        filename: stored.filename,
        skills_found: profile.skills.len(),
        profile,
    }))
}

async fn read_resume_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        return Ok((filename, data));
    }
    Err(AppError::Validation(format!(
        "No file uploaded in the '{RESUME_FIELD}' field"
    )))
}
