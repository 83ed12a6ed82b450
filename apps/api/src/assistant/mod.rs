//! Writing assistant: template suggestions and rewrites, answers about the
//! generation settings, and campaign advice drawn from the send statistics.
//!
//! Every reply is plain text from `TextGenerator::write_text`. Nothing here
//! is persisted; saving a suggested template goes through `PUT /api/settings`.

pub mod handlers;
mod prompts;

use tracing::info;

use crate::errors::AppError;
use crate::profile::Profile;
use crate::settings::GenerationSettings;
use crate::state::AppState;
use crate::stats::StatsSnapshot;

use prompts::{
    ASSISTANT_SYSTEM, HELP_PROMPT, IMPROVE_TEMPLATE_PROMPT, OPTIMIZE_PROMPT,
    SUGGEST_TEMPLATE_PROMPT, TEMPLATE_PLACEHOLDERS,
};

/// Skills listed in the template-suggestion prompt.
const PROMPT_SKILLS: usize = 10;

/// Drafts a manual template tailored to the stored profile.
pub async fn suggest_template(state: &AppState) -> Result<String, AppError> {
    let profile = state
        .profiles
        .get()
        .await
        .ok_or_else(|| AppError::NotFound("No profile yet, upload a résumé first".to_string()))?;
    let settings = state.settings.get().await;

    let template = ask(state, &suggest_template_prompt(&profile, &settings), &settings).await?;
    info!("Suggested a template ({} chars)", template.len());
    Ok(template)
}

/// Rewrites `template` (or the saved manual template when none is given)
/// according to `feedback`.
pub async fn improve_template(
    state: &AppState,
    template: Option<&str>,
    feedback: &str,
) -> Result<String, AppError> {
    let feedback = feedback.trim();
    if feedback.is_empty() {
        return Err(AppError::Validation("feedback is required".to_string()));
    }
    let settings = state.settings.get().await;
    let template = template
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(settings.email_template.as_str());

    let prompt = IMPROVE_TEMPLATE_PROMPT
        .replace("{placeholders}", TEMPLATE_PLACEHOLDERS)
        .replace("{feedback}", feedback)
        .replace("{template}", template);
    ask(state, &prompt, &settings).await
}

/// Answers a question about the current generation settings.
pub async fn answer_question(state: &AppState, question: &str) -> Result<String, AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("question is required".to_string()));
    }
    let settings = state.settings.get().await;

    let prompt = HELP_PROMPT
        .replace("{settings}", &settings_summary(&settings, state.config.llm_model.as_str()))
        .replace("{question}", question);
    ask(state, &prompt, &settings).await
}

/// Campaign advice based on the current statistics snapshot.
pub async fn suggest_optimizations(state: &AppState) -> Result<String, AppError> {
    let snapshot = state.stats.snapshot().await;
    let settings = state.settings.get().await;

    let prompt = OPTIMIZE_PROMPT.replace("{stats}", &stats_summary(&snapshot));
    ask(state, &prompt, &settings).await
}

async fn ask(
    state: &AppState,
    prompt: &str,
    settings: &GenerationSettings,
) -> Result<String, AppError> {
    Ok(state
        .generator
        .write_text(prompt, ASSISTANT_SYSTEM, settings)
        .await?)
}

fn suggest_template_prompt(profile: &Profile, settings: &GenerationSettings) -> String {
    SUGGEST_TEMPLATE_PROMPT
        .replace("{placeholders}", TEMPLATE_PLACEHOLDERS)
        .replace("{tone}", settings.email_tone.guidance())
        .replace("{profile}", &profile_summary(profile))
}

fn profile_summary(profile: &Profile) -> String {
    let or_unknown = |value: &Option<String>| {
        value.clone().unwrap_or_else(|| "not stated".to_string())
    };
    let skills = if profile.skills.is_empty() {
        "not stated".to_string()
    } else {
        profile
            .skills
            .iter()
            .take(PROMPT_SKILLS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };

    [
        format!("- Name: {}", or_unknown(&profile.name)),
        format!("- Title: {}", or_unknown(&profile.title)),
        format!("- Experience: {} years", profile.experience_years),
        format!("- Skills: {skills}"),
        format!("- Location: {}", or_unknown(&profile.location)),
        format!("- Email: {}", or_unknown(&profile.email)),
        format!("- LinkedIn: {}", or_unknown(&profile.linkedin)),
    ]
    .join("\n")
}

fn settings_summary(settings: &GenerationSettings, default_model: &str) -> String {
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };
    [
        format!(
            "- Model: {}",
            settings.ai_model.as_deref().unwrap_or(default_model)
        ),
        format!("- Tone: {}", settings.email_tone.guidance()),
        format!("- Maximum length: {} words", settings.max_email_length),
        format!("- Emojis: {}", yes_no(settings.use_emojis)),
        format!("- Attach résumé automatically: {}", yes_no(settings.auto_attach_cv)),
    ]
    .join("\n")
}

fn stats_summary(snapshot: &StatsSnapshot) -> String {
    let companies = if snapshot.top_companies.is_empty() {
        "none yet".to_string()
    } else {
        snapshot
            .top_companies
            .iter()
            .map(|c| format!("{} ({})", c.company, c.count))
            .collect::<Vec<_>>()
            .join(", ")
    };

    [
        format!("- Emails sent: {}", snapshot.total_sent),
        format!("- Success rate: {}%", snapshot.success_rate),
        format!("- Errors: {}", snapshot.total_errors),
        format!("- Not sent (composition failed): {}", snapshot.emails_by_status.pending),
        format!("- Top companies: {companies}"),
        format!(
            "- AI-written emails: {}, manual template: {}",
            snapshot.template_usage.ai_generated, snapshot.template_usage.manual
        ),
        format!("- Résumés analyzed: {}", snapshot.ai_usage.cv_analyzed),
        format!("- Average response time: {} ms", snapshot.avg_response_time),
    ]
    .join("\n")
}
