//! Compose-then-send flow for one application email.
//!
//! A send always ends in a recorded outcome: generation failures are
//! recorded as `pending` (nothing left the building), mailer failures as
//! `error`. Each outcome updates the stats aggregate and the history log.

pub mod handlers;

use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::generation::composer::render_manual;
use crate::generation::{EmailBrief, GeneratedEmail, GenerationError};
use crate::history::HistoryEntry;
use crate::mailer::OutgoingEmail;
use crate::profile::Profile;
use crate::settings::GenerationSettings;
use crate::state::AppState;
use crate::stats::{SendEvent, SendStatus};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendRequest {
    pub to_email: String,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    /// Overrides `auto_attach_cv` from the generation settings.
    pub attach_cv: Option<bool>,
    /// Defaults to true. False renders the manual template.
    pub use_ai: Option<bool>,
}

impl SendRequest {
    fn tidied(self) -> Self {
        Self {
            to_email: self.to_email.trim().to_string(),
            company_name: non_blank(self.company_name),
            job_title: non_blank(self.job_title),
            job_description: non_blank(self.job_description),
            ..self
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.to_email.is_empty() {
            return Err(AppError::Validation("to_email is required".to_string()));
        }
        if !self.to_email.contains('@') {
            return Err(AppError::Validation(format!(
                "'{}' is not an email address",
                self.to_email
            )));
        }
        Ok(())
    }

    fn brief(&self, profile: Profile) -> EmailBrief {
        EmailBrief {
            profile,
            company_name: self.company_name.clone(),
            job_title: self.job_title.clone(),
            job_description: self.job_description.clone(),
        }
    }

    fn use_ai(&self) -> bool {
        self.use_ai.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub status: SendStatus,
    /// Absent when composition failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub response_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// False if the stats or history update could not be written to disk.
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Draft {
    pub subject: String,
    pub html_body: String,
    pub generated_by_ai: bool,
}

/// Composes the email without sending or recording anything.
pub async fn draft_application(state: &AppState, request: SendRequest) -> Result<Draft, AppError> {
    let request = request.tidied();
    request.validate()?;
    let profile = require_profile(state).await?;
    let settings = state.settings.get().await;

    let brief = request.brief(profile);
    let email = compose(state, &brief, &settings, request.use_ai()).await?;
    Ok(Draft {
        subject: email.subject,
        html_body: email.html_body,
        generated_by_ai: request.use_ai(),
    })
}

/// Composes, sends, and records one application.
///
/// Input problems are returned as errors before anything is recorded.
/// Composition and delivery failures are part of the outcome instead.
pub async fn send_application(
    state: &AppState,
    request: SendRequest,
) -> Result<SendOutcome, AppError> {
    let request = request.tidied();
    request.validate()?;
    let profile = require_profile(state).await?;
    let settings = state.settings.get().await;
    let use_ai = request.use_ai();

    let started = Instant::now();
    let brief = request.brief(profile);

    let (status, subject, failure) = match compose(state, &brief, &settings, use_ai).await {
        Err(e) => {
            warn!("Could not compose email for {}: {e}", request.to_email);
            (SendStatus::Pending, None, Some(e.to_string()))
        }
        Ok(email) => {
            if use_ai {
                if let Err(e) = state.stats.record_ai_generation().await {
                    warn!("Generation counter not saved: {e}");
                }
            }
            let attach = request.attach_cv.unwrap_or(settings.auto_attach_cv);
            let attachment = if attach {
                state.resumes.load_attachment().await.unwrap_or_else(|e| {
                    warn!("Could not read stored résumé, sending without it: {e}");
                    None
                })
            } else {
                None
            };

            let outgoing = OutgoingEmail {
                to: request.to_email.clone(),
                subject: email.subject,
                html_body: email.html_body,
                attachment,
            };
            match state.mailer.send(&outgoing).await {
                Ok(()) => {
                    info!("Email sent to {}", outgoing.to);
                    (SendStatus::Success, Some(outgoing.subject), None)
                }
                Err(e) => {
                    error!("Email to {} failed: {e}", outgoing.to);
                    (SendStatus::Error, Some(outgoing.subject), Some(e.to_string()))
                }
            }
        }
    };

    let response_time_ms = started.elapsed().as_secs_f64() * 1000.0;
    let persisted = record_outcome(state, &request, status, response_time_ms, use_ai).await;

    Ok(SendOutcome {
        status,
        subject,
        response_time_ms,
        error: failure,
        persisted,
    })
}

async fn require_profile(state: &AppState) -> Result<Profile, AppError> {
    state
        .profiles
        .get()
        .await
        .ok_or_else(|| AppError::NotFound("No profile yet, upload a résumé first".to_string()))
}

async fn compose(
    state: &AppState,
    brief: &EmailBrief,
    settings: &GenerationSettings,
    use_ai: bool,
) -> Result<GeneratedEmail, GenerationError> {
    if !use_ai {
        return Ok(render_manual(&settings.email_template, brief));
    }

    state.generator.generate_email(brief, settings).await
}

/// Returns whether both the stats and the history update were saved.
async fn record_outcome(
    state: &AppState,
    request: &SendRequest,
    status: SendStatus,
    response_time_ms: f64,
    generated_by_ai: bool,
) -> bool {
    let event = SendEvent {
        company: request.company_name.clone(),
        status,
        response_time_ms,
        generated_by_ai,
        timestamp: Utc::now(),
    };
    let stats_saved = match state.stats.record_send(event).await {
        Ok(()) => true,
        Err(e) => {
            error!("Send to {} not recorded in stats: {e}", request.to_email);
            false
        }
    };

    let entry = HistoryEntry::new(
        request.to_email.clone(),
        request.company_name.clone(),
        request.job_title.clone(),
        status,
    );
    let history_saved = match state.history.record(entry).await {
        Ok(()) => true,
        Err(e) => {
            error!("Send to {} not recorded in history: {e}", request.to_email);
            false
        }
    };

    stats_saved && history_saved
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
