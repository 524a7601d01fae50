use std::time::Duration;

use anyhow::{Context, Result};

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    /// Pause before search/filter results appear.
    pub search_delay: Duration,
    /// How long success/error feedback stays visible after a profile save.
    pub feedback_duration: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("JOBSPARK_API_URL")
            .context("Required environment variable 'JOBSPARK_API_URL' is not set")?;

        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(parse_or(&lookup, "JOBSPARK_TIMEOUT_SECS", 30)?),
            search_delay: Duration::from_millis(parse_or(
                &lookup,
                "JOBSPARK_SEARCH_DELAY_MS",
                500,
            )?),
            feedback_duration: Duration::from_millis(parse_or(
                &lookup,
                "JOBSPARK_FEEDBACK_MS",
                3000,
            )?),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'")),
        None => Ok(default),
    }
}
