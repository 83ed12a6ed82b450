//! User-chosen generation options, persisted as a single JSON document.

pub mod handlers;

use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::storage::{Document, DocumentStore, StoreError};

/// Allowed word budget for a generated email body.
pub const EMAIL_LENGTH_RANGE: RangeInclusive<u32> = 100..=300;

pub const DEFAULT_EMAIL_TEMPLATE: &str = "\
Dear [COMPANY] team,

I am a developer with hands-on experience in [SKILLS]. I saw that you are looking for \
[JOB_TITLE] and I would love to bring that experience to your team.

My background includes [EXPERIENCE], and I enjoy turning ambiguous problems into \
working software.

I would be glad to talk about how I could contribute.

Best regards,
[NAME]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTone {
    #[default]
    ConfidentHumble,
    Formal,
    Casual,
    Enthusiastic,
}

impl EmailTone {
    /// Style instruction handed to the text generator.
    pub fn guidance(&self) -> &'static str {
        match self {
            EmailTone::ConfidentHumble => {
                "confident but humble: show value without overselling, no desperation"
            }
            EmailTone::Formal => "formal and polished: courteous business register, no slang",
            EmailTone::Casual => "relaxed and conversational, like a message to a peer",
            EmailTone::Enthusiastic => {
                "warm and enthusiastic about the company, still concise and credible"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Model override for the text generator. `None` uses the service default.
    pub ai_model: Option<String>,
    pub email_tone: EmailTone,
    /// Target word count for generated bodies.
    pub max_email_length: u32,
    pub use_emojis: bool,
    pub auto_attach_cv: bool,
    /// Manual template with `[COMPANY]`, `[JOB_TITLE]`, `[SKILLS]`,
    /// `[EXPERIENCE]` and `[NAME]` placeholders.
    pub email_template: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            ai_model: None,
            email_tone: EmailTone::default(),
            max_email_length: 150,
            use_emojis: false,
            auto_attach_cv: true,
            email_template: DEFAULT_EMAIL_TEMPLATE.to_string(),
        }
    }
}

impl GenerationSettings {
    pub fn validate(&self) -> Result<(), AppError> {
        if !EMAIL_LENGTH_RANGE.contains(&self.max_email_length) {
            return Err(AppError::Validation(format!(
                "max_email_length must be between {} and {} words, got {}",
                EMAIL_LENGTH_RANGE.start(),
                EMAIL_LENGTH_RANGE.end(),
                self.max_email_length
            )));
        }
        if self.email_template.trim().is_empty() {
            return Err(AppError::Validation(
                "email_template must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn tidied(mut self) -> Self {
        self.ai_model = self
            .ai_model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        self
    }
}

pub struct SettingsStore {
    document: Document<GenerationSettings>,
}

impl SettingsStore {
    pub async fn open(store: Arc<dyn DocumentStore<GenerationSettings>>) -> Result<Self, StoreError> {
        Ok(Self {
            document: Document::open(store).await?,
        })
    }

    pub async fn get(&self) -> GenerationSettings {
        self.document.read().await
    }

    pub async fn update(&self, settings: GenerationSettings) -> Result<GenerationSettings, AppError> {
        settings.validate()?;
        let settings = settings.tidied();
        let saved = settings.clone();
        self.document.update(move |current| *current = settings).await?;
        info!(
            "Generation settings saved (tone: {:?}, length: {})",
            saved.email_tone, saved.max_email_length
        );
        Ok(saved)
    }
}
