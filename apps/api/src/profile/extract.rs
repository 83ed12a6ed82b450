use tracing::info;

use crate::errors::AppError;
use crate::generation::TextGenerator;
use crate::profile::{normalize_profile, Profile};
use crate::settings::GenerationSettings;

/// Pulls plain text out of a PDF. CPU-bound; call from `spawn_blocking`.
pub fn extract_resume_text(pdf: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(pdf)
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "The PDF contains no extractable text".to_string(),
        ));
    }
    Ok(text)
}

/// Runs profile extraction on résumé text and normalizes the result.
pub async fn analyze_resume(
    text: &str,
    generator: &dyn TextGenerator,
    settings: &GenerationSettings,
) -> Result<Profile, AppError> {
    let raw = generator.extract_profile(text, settings).await?;
    if !raw.is_object() {
        return Err(AppError::UnprocessableEntity(
            "Profile extraction did not return an object".to_string(),
        ));
    }

    let profile = normalize_profile(&raw);
    info!(
        "Profile extracted for {} ({} skills)",
        profile.name.as_deref().unwrap_or("unnamed candidate"),
        profile.skills.len()
    );
    Ok(profile)
}
