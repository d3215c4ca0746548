use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::GEMINI_API_URL;

/// Origins of the deployed frontends plus the local Vite dev servers.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://jdresumeanalyzer.netlify.app",
    "https://jdconnect.netlify.app",
    "http://localhost:5173",
    "http://localhost:5174",
];

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: usize = 24 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// A missing `GEMINI_API_KEY` is not fatal: analysis requests fail with a
/// configuration error instead, while text extraction keeps working.
#[derive(Debug, Clone)]
pub struct Config {
    pub analyzer: AnalyzerConfig,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Settings injected into the `AnalysisRequester` at construction.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub api_key: Option<String>,
    /// Exposes upstream error detail to callers when set.
    pub debug_mode: bool,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            debug_mode: false,
            endpoint: GEMINI_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = match optional_env("GEMINI_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .context("GEMINI_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let max_body_bytes = match optional_env("MAX_BODY_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .context("MAX_BODY_BYTES must be a byte count")?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let allowed_origins = match optional_env("ALLOWED_ORIGINS") {
            Some(v) => parse_origins(&v),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Config {
            analyzer: AnalyzerConfig {
                api_key: optional_env("GEMINI_API_KEY"),
                debug_mode: optional_env("DEBUG")
                    .map(|v| parse_flag(&v))
                    .unwrap_or(false),
                endpoint: optional_env("GEMINI_API_URL")
                    .unwrap_or_else(|| GEMINI_API_URL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            allowed_origins,
            max_body_bytes,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads an env var, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Boolean-like env strings: `1`, `true`, `yes`, `on` (any case).
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_truthy_strings() {
        for v in ["1", "true", "TRUE", "Yes", " on "] {
            assert!(parse_flag(v), "expected {v:?} to enable debug mode");
        }
    }

    #[test]
    fn test_parse_flag_rejects_everything_else() {
        for v in ["0", "false", "no", "off", "", "enabled"] {
            assert!(!parse_flag(v), "expected {v:?} to leave debug mode off");
        }
    }

    #[test]
    fn test_parse_origins_trims_and_drops_empty_entries() {
        let origins = parse_origins(" https://a.example/ , ,http://localhost:5173");
        assert_eq!(origins, vec!["https://a.example", "http://localhost:5173"]);
    }

    #[test]
    fn test_analyzer_config_default_points_at_gemini() {
        let cfg = AnalyzerConfig::default();
        assert!(cfg.api_key.is_none());
        assert!(!cfg.debug_mode);
        assert_eq!(cfg.endpoint, GEMINI_API_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }
}
