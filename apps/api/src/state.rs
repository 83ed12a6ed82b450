use std::sync::Arc;

use crate::config::Config;
use crate::generation::TextGenerator;
use crate::history::HistoryLog;
use crate::mailer::Mailer;
use crate::profile::{ProfileStore, ResumeVault};
use crate::settings::SettingsStore;
use crate::stats::StatsAggregator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub stats: Arc<StatsAggregator>,
    pub history: Arc<HistoryLog>,
    pub profiles: Arc<ProfileStore>,
    pub settings: Arc<SettingsStore>,
    pub resumes: Arc<ResumeVault>,
    /// `LlmTextGenerator` when an API key is configured, `DisabledGenerator` otherwise.
    pub generator: Arc<dyn TextGenerator>,
    pub mailer: Arc<dyn Mailer>,
}
