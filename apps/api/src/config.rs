use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_QUESTION_COUNT: usize = 6;
const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 15;

/// Service configuration loaded from environment variables.
///
/// Nothing is strictly required: without `ANTHROPIC_API_KEY` the service runs
/// entirely on its local question templates and keyword scoring.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Questions per interview session.
    pub question_count: usize,
    /// Upper bound on any single remote content call, retries included.
    pub remote_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            question_count: parse_env("INTERVIEW_QUESTION_COUNT", DEFAULT_QUESTION_COUNT)?,
            remote_timeout: Duration::from_secs(parse_env(
                "REMOTE_TIMEOUT_SECS",
                DEFAULT_REMOTE_TIMEOUT_SECS,
            )?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            port: 8080,
            rust_log: "info".to_string(),
            question_count: DEFAULT_QUESTION_COUNT,
            remote_timeout: Duration::from_secs(DEFAULT_REMOTE_TIMEOUT_SECS),
        }
    }
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
