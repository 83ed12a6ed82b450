use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::generation::composer::{build_email_prompt, validate_generated};
use crate::generation::prompts::{
    email_system, PROFILE_EXTRACT_PROMPT, PROFILE_EXTRACT_SYSTEM,
};
use crate::generation::{EmailBrief, GeneratedEmail, GenerationError, TextGenerator};
use crate::llm_client::LlmClient;
use crate::settings::GenerationSettings;

/// Raw generator reply before validation.
#[derive(Debug, Deserialize)]
struct RawEmail {
    subject: Option<String>,
    html_body: Option<String>,
}

/// `TextGenerator` backed by the Anthropic Messages API.
pub struct LlmTextGenerator {
    llm: LlmClient,
}

impl LlmTextGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn generate_email(
        &self,
        brief: &EmailBrief,
        settings: &GenerationSettings,
    ) -> Result<GeneratedEmail, GenerationError> {
        let prompt = build_email_prompt(brief, settings);
        let model = settings.ai_model.as_deref();

        let raw: RawEmail = self
            .llm
            .call_json(&prompt, &email_system(), model)
            .await?;
        let email = validate_generated(raw.subject, raw.html_body)?;

        info!(
            "Generated email for {} with {}",
            brief.company_name.as_deref().unwrap_or("open application"),
            model.unwrap_or(self.llm.model())
        );
        Ok(email)
    }

    async fn extract_profile(
        &self,
        resume_text: &str,
        settings: &GenerationSettings,
    ) -> Result<serde_json::Value, GenerationError> {
        let prompt = PROFILE_EXTRACT_PROMPT.replace("{resume_text}", resume_text);
        let value = self
            .llm
            .call_json(&prompt, PROFILE_EXTRACT_SYSTEM, settings.ai_model.as_deref())
            .await?;
        Ok(value)
    }

    async fn write_text(
        &self,
        prompt: &str,
        system: &str,
        settings: &GenerationSettings,
    ) -> Result<String, GenerationError> {
        let text = self
            .llm
            .call_text(prompt, system, settings.ai_model.as_deref())
            .await?;
        Ok(text)
    }
}

/// Stand-in used when no API key is configured. Manual templates still work.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate_email(
        &self,
        _brief: &EmailBrief,
        _settings: &GenerationSettings,
    ) -> Result<GeneratedEmail, GenerationError> {
        Err(GenerationError::Disabled)
    }

    async fn extract_profile(
        &self,
        _resume_text: &str,
        _settings: &GenerationSettings,
    ) -> Result<serde_json::Value, GenerationError> {
        Err(GenerationError::Disabled)
    }

    async fn write_text(
        &self,
        _prompt: &str,
        _system: &str,
        _settings: &GenerationSettings,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::Disabled)
    }
}
