use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MODEL;

const DEFAULT_SAMPLE_CAP: usize = 100;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding every persisted JSON document and uploaded résumé.
    pub data_dir: PathBuf,
    /// Text generation is disabled when this is absent.
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub smtp: SmtpSettings,
    /// How many recent response times feed the average.
    pub response_time_sample_cap: usize,
    pub max_upload_bytes: usize,
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

// Keeps the password out of startup logs.
impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let username = require("SMTP_USERNAME")?;
        let smtp = SmtpSettings {
            host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: parse_or(get("SMTP_PORT"), 587, "SMTP_PORT must be a valid port number")?,
            password: require("SMTP_PASSWORD")?,
            from: get("SMTP_FROM").unwrap_or_else(|| username.clone()),
            username,
        };

        let response_time_sample_cap = parse_or(
            get("RESPONSE_TIME_SAMPLE_CAP"),
            DEFAULT_SAMPLE_CAP,
            "RESPONSE_TIME_SAMPLE_CAP must be a positive integer",
        )?;
        if response_time_sample_cap == 0 {
            anyhow::bail!("RESPONSE_TIME_SAMPLE_CAP must be a positive integer");
        }

        Ok(Config {
            port: parse_or(get("PORT"), 8080, "PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            data_dir: PathBuf::from(get("DATA_DIR").unwrap_or_else(|| "data".to_string())),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            smtp,
            response_time_sample_cap,
            max_upload_bytes: parse_or(
                get("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
                "MAX_UPLOAD_BYTES must be a byte count",
            )?,
        })
    }

    /// Path of a persisted document inside the data directory.
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T, msg: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => v.parse::<T>().with_context(|| msg.to_string()),
        None => Ok(default),
    }
}
