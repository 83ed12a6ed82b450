mod assistant;
mod config;
mod errors;
mod generation;
mod history;
mod llm_client;
mod mailer;
mod outreach;
mod profile;
mod routes;
mod settings;
mod state;
mod stats;
mod storage;
#[cfg(test)]
mod test_support;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::{DisabledGenerator, LlmTextGenerator, TextGenerator};
use crate::history::{HistoryEntry, HistoryLog};
use crate::llm_client::LlmClient;
use crate::mailer::SmtpMailer;
use crate::profile::{Profile, ProfileStore, ResumeVault, StoredResume};
use crate::routes::build_router;
use crate::settings::{GenerationSettings, SettingsStore};
use crate::state::AppState;
use crate::stats::{StatsAggregator, StatsRecord};
use crate::storage::JsonFileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ApplyMail API v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Cannot create data dir {}", config.data_dir.display()))?;
    info!("Data directory: {}", config.data_dir.display());

    // Persisted documents; each loads its file or starts from defaults
    let stats = StatsAggregator::open(
        Arc::new(JsonFileStore::<StatsRecord>::new(config.data_file("stats.json"))),
        config.response_time_sample_cap,
    )
    .await?;
    let history = HistoryLog::open(Arc::new(JsonFileStore::<VecDeque<HistoryEntry>>::new(
        config.data_file("email_history.json"),
    )))
    .await?;
    let profiles = ProfileStore::open(Arc::new(JsonFileStore::<Option<Profile>>::new(
        config.data_file("user_profile.json"),
    )))
    .await?;
    let settings = SettingsStore::open(Arc::new(JsonFileStore::<GenerationSettings>::new(
        config.data_file("app_config.json"),
    )))
    .await?;
    let resumes = ResumeVault::open(
        config.data_file("uploads"),
        Arc::new(JsonFileStore::<Option<StoredResume>>::new(
            config.data_file("resume.json"),
        )),
    )
    .await?;

    // Text generator: LLM-backed when a key is configured, disabled otherwise
    let generator: Arc<dyn TextGenerator> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.llm_model.clone());
            info!("LLM client initialized (model: {})", llm.model());
            Arc::new(LlmTextGenerator::new(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; AI generation and résumé analysis are disabled");
            Arc::new(DisabledGenerator)
        }
    };

    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);

    // Build app state
    let state = AppState {
        config: config.clone(),
        stats: Arc::new(stats),
        history: Arc::new(history),
        profiles: Arc::new(profiles),
        settings: Arc::new(settings),
        resumes: Arc::new(resumes),
        generator,
        mailer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
