//! Text generation: outreach emails, résumé-to-profile extraction, and the
//! plain-text replies behind the writing assistant.
//!
//! `TextGenerator` is the seam between orchestration and the generative API.
//! `AppState` holds an `Arc<dyn TextGenerator>`, chosen at startup:
//! `LlmTextGenerator` when an API key is configured, `DisabledGenerator`
//! otherwise. Manual template rendering lives in `composer` and needs no API.

pub mod composer;
pub mod llm;
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::profile::Profile;
use crate::settings::GenerationSettings;

pub use llm::{DisabledGenerator, LlmTextGenerator};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Text generation is not configured (set ANTHROPIC_API_KEY)")]
    Disabled,

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Generated email rejected: {0}")]
    Invalid(String),
}

/// Everything the generator needs to write one application email.
#[derive(Debug, Clone)]
pub struct EmailBrief {
    pub profile: Profile,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEmail {
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_email(
        &self,
        brief: &EmailBrief,
        settings: &GenerationSettings,
    ) -> Result<GeneratedEmail, GenerationError>;

    /// Returns the raw structured profile; callers normalize it.
    async fn extract_profile(
        &self,
        resume_text: &str,
        settings: &GenerationSettings,
    ) -> Result<serde_json::Value, GenerationError>;

    /// Free-form plain-text reply, used by the writing assistant.
    async fn write_text(
        &self,
        prompt: &str,
        system: &str,
        settings: &GenerationSettings,
    ) -> Result<String, GenerationError>;
}
