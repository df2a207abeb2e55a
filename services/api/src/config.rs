//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

pub const DEFAULT_CLOUD_MODELS: [&str; 3] = ["gpt-4o-mini", "gpt-3.5-turbo", "gpt-4"];
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,

    // --- Cloud LLM ---
    pub openai_api_key: Option<String>,
    pub openai_api_base: Option<String>,
    pub cloud_models: Vec<String>,
    pub cloud_timeout: Duration,

    // --- Local LLM ---
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub local_timeout: Duration,
    pub secondary_local_enabled: bool,
    pub secondary_local_model: String,
    /// Budget for a whole secondary run, which may summarize many chunks in turn.
    pub secondary_local_timeout: Duration,

    // --- Email ---
    pub email_api_key: Option<String>,
    pub email_from: String,
    pub email_api_url: String,
    pub email_timeout: Duration,

    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default =
            |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        // --- Load Server and Database Settings ---
        let bind_address_str = or_default("BIND_ADDRESS", "0.0.0.0:8000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            var("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = or_default("CORS_ORIGIN", "http://localhost:3000");

        // --- Load Cloud Provider Settings (key is optional) ---
        let openai_api_key = var("OPENAI_API_KEY");
        let openai_api_base = var("OPENAI_API_BASE");
        let cloud_models = match var("CLOUD_MODELS") {
            Some(list) => {
                let models: Vec<String> = list
                    .split(',')
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect();
                if models.is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "CLOUD_MODELS".to_string(),
                        "expected a comma-separated list of model names".to_string(),
                    ));
                }
                models
            }
            None => DEFAULT_CLOUD_MODELS.iter().map(|m| m.to_string()).collect(),
        };
        let cloud_timeout = parse_secs(&var, "CLOUD_TIMEOUT_SECS", 120)?;

        // --- Load Local Provider Settings ---
        let ollama_base_url = or_default("OLLAMA_BASE_URL", "http://localhost:11434");
        let ollama_model = or_default("OLLAMA_MODEL", "mistral:7b");
        let local_timeout = parse_secs(&var, "LOCAL_TIMEOUT_SECS", 60)?;
        let secondary_local_enabled = match var("SECONDARY_LOCAL_ENABLED") {
            Some(value) => parse_bool("SECONDARY_LOCAL_ENABLED", &value)?,
            None => false,
        };
        let secondary_local_model = or_default("SECONDARY_LOCAL_MODEL", "bart-large-cnn");
        let secondary_local_timeout = parse_secs(&var, "SECONDARY_LOCAL_TIMEOUT_SECS", 600)?;

        // --- Load Email Settings ---
        let email_api_key = var("EMAIL_API_KEY");
        let email_from = or_default("EMAIL_FROM", "noreply@yourdomain.com");
        let email_api_url = or_default("EMAIL_API_URL", "https://api.sendgrid.com");
        let email_timeout = parse_secs(&var, "EMAIL_TIMEOUT_SECS", 30)?;

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(value) => value.parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string(), e.to_string())
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            openai_api_key,
            openai_api_base,
            cloud_models,
            cloud_timeout,
            ollama_base_url,
            ollama_model,
            local_timeout,
            secondary_local_enabled,
            secondary_local_model,
            secondary_local_timeout,
            email_api_key,
            email_from,
            email_api_url,
            email_timeout,
            max_upload_bytes,
        })
    }
}

fn parse_secs<F>(var: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(Duration::from_secs(default)),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("'{}' is not a boolean", other),
        )),
    }
}
