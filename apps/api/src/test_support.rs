//! Fakes and fixtures shared by the unit and router tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::{Config, SmtpSettings};
use crate::generation::{EmailBrief, GeneratedEmail, GenerationError, TextGenerator};
use crate::history::{HistoryEntry, HistoryLog};
use crate::llm_client::DEFAULT_MODEL;
use crate::mailer::{MailError, Mailer, OutgoingEmail};
use crate::profile::{Experience, Profile, ProfileStore, ResumeVault, StoredResume};
use crate::settings::{GenerationSettings, SettingsStore};
use crate::state::AppState;
use crate::stats::{StatsAggregator, StatsRecord};
use crate::storage::memory::MemoryStore;

pub fn sample_profile() -> Profile {
    Profile {
        name: Some("Ada Lovelace".to_string()),
        email: Some("ada@example.com".to_string()),
        title: Some("Backend Engineer".to_string()),
        skills: vec!["Rust".to_string(), "Tokio".to_string(), "PostgreSQL".to_string()],
        experience_years: 6,
        experience: vec![Experience {
            title: Some("Senior Engineer".to_string()),
            company: Some("Analytical Engines".to_string()),
            period: Some("2019-2024".to_string()),
            description: None,
        }],
        ..Profile::default()
    }
}

pub const FAKE_REPLY: &str = "Keep it short and name one concrete project.";

pub struct FakeGenerator {
    fail: bool,
    profile: Value,
    email_calls: AtomicUsize,
    extract_models: Mutex<Vec<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new() -> Self {
        Self {
            fail: false,
            profile: json!({"name": "Ada Lovelace", "email": "ada@example.com", "skills": ["Rust"]}),
            email_calls: AtomicUsize::new(0),
            extract_models: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_profile(profile: Value) -> Self {
        Self {
            profile,
            ..Self::new()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn email_calls(&self) -> usize {
        self.email_calls.load(Ordering::SeqCst)
    }

    /// The model override passed to each `extract_profile` call.
    pub fn extract_models(&self) -> Vec<Option<String>> {
        self.extract_models.lock().unwrap().clone()
    }

    /// Prompts passed to `write_text`, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate_email(
        &self,
        brief: &EmailBrief,
        _settings: &GenerationSettings,
    ) -> Result<GeneratedEmail, GenerationError> {
        self.email_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError::Invalid("body too short (3 chars)".to_string()));
        }
        Ok(GeneratedEmail {
            subject: format!(
                "Application - {}",
                brief.profile.name.as_deref().unwrap_or("Candidate")
            ),
            html_body: "<p>I would love to join your team and help build reliable systems.</p>"
                .to_string(),
        })
    }

    async fn extract_profile(
        &self,
        _resume_text: &str,
        settings: &GenerationSettings,
    ) -> Result<Value, GenerationError> {
        self.extract_models
            .lock()
            .unwrap()
            .push(settings.ai_model.clone());
        if self.fail {
            return Err(GenerationError::Disabled);
        }
        Ok(self.profile.clone())
    }

    async fn write_text(
        &self,
        prompt: &str,
        _system: &str,
        _settings: &GenerationSettings,
    ) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(GenerationError::Disabled);
        }
        Ok(FAKE_REPLY.to_string())
    }
}

pub struct RecordingMailer {
    fail: AtomicBool,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        let mailer = Self::new();
        mailer.fail.store(true, Ordering::SeqCst);
        mailer
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MailError::Build("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// An `AppState` over in-memory stores, with handles to the fakes behind it.
pub struct TestApp {
    pub state: AppState,
    pub stats_store: Arc<MemoryStore<StatsRecord>>,
    pub generator: Arc<FakeGenerator>,
    pub mailer: Arc<RecordingMailer>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new(generator: FakeGenerator, mailer: RecordingMailer) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let stats_store = Arc::new(MemoryStore::<StatsRecord>::new());
        let generator = Arc::new(generator);
        let mailer = Arc::new(mailer);

        let state = AppState {
            stats: Arc::new(
                StatsAggregator::open(stats_store.clone(), config.response_time_sample_cap)
                    .await
                    .unwrap(),
            ),
            history: Arc::new(
                HistoryLog::open(Arc::new(MemoryStore::<VecDeque<HistoryEntry>>::new()))
                    .await
                    .unwrap(),
            ),
            profiles: Arc::new(
                ProfileStore::open(Arc::new(MemoryStore::<Option<Profile>>::new()))
                    .await
                    .unwrap(),
            ),
            settings: Arc::new(
                SettingsStore::open(Arc::new(MemoryStore::<GenerationSettings>::new()))
                    .await
                    .unwrap(),
            ),
            resumes: Arc::new(
                ResumeVault::open(
                    dir.path().join("uploads"),
                    Arc::new(MemoryStore::<Option<StoredResume>>::new()),
                )
                .await
                .unwrap(),
            ),
            generator: generator.clone(),
            mailer: mailer.clone(),
            config,
        };

        Self {
            state,
            stats_store,
            generator,
            mailer,
            _dir: dir,
        }
    }
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        port: 0,
        rust_log: "debug".to_string(),
        data_dir: dir.path().to_path_buf(),
        anthropic_api_key: None,
        llm_model: DEFAULT_MODEL.to_string(),
        smtp: SmtpSettings {
            host: "localhost".to_string(),
            port: 2525,
            username: "me@example.com".to_string(),
            password: "secret".to_string(),
            from: "me@example.com".to_string(),
        },
        response_time_sample_cap: 100,
        max_upload_bytes: 1024 * 1024,
    }
}
