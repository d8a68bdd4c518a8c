//! Runtime settings read from the process environment
//!
//! Binaries call `dotenv::dotenv().ok()` first so a local `.env` file works.

use crate::error::AdvisorError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ML_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_PORT: u16 = 8080;

const GEMINI_KEY_VARS: [&str; 3] = ["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_GEMINI_API_KEY"];

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MlServiceSettings {
    pub base_url: String,
    pub health_timeout: Duration,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub gemini: GeminiSettings,
    pub ml_service: MlServiceSettings,
    pub port: u16,
}

impl Settings {
    /// Load settings. A missing Gemini key is a startup error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = GEMINI_KEY_VARS
            .iter()
            .find_map(|name| non_empty(name))
            .ok_or_else(|| {
                AdvisorError::Config(
                    "Gemini API key not found. Set GEMINI_API_KEY in your environment or .env file"
                        .to_string(),
                )
            })?;

        let upstream_timeout = parse_or(&non_empty("UPSTREAM_TIMEOUT_SECS"), "UPSTREAM_TIMEOUT_SECS", 30u64)?;
        let health_timeout = parse_or(&non_empty("ML_HEALTH_TIMEOUT_MS"), "ML_HEALTH_TIMEOUT_MS", 2_000u64)?;

        let base_url = non_empty("ML_SERVICE_URL")
            .or_else(|| non_empty("NEXT_PUBLIC_ML_API_URL"))
            .unwrap_or_else(|| DEFAULT_ML_SERVICE_URL.to_string());

        let port = parse_or(
            &non_empty("PORT").or_else(|| non_empty("API_PORT")),
            "PORT",
            DEFAULT_PORT,
        )?;

        Ok(Self {
            gemini: GeminiSettings {
                api_key,
                model: non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                timeout: Duration::from_secs(upstream_timeout),
            },
            ml_service: MlServiceSettings {
                base_url: base_url.trim_end_matches('/').to_string(),
                health_timeout: Duration::from_millis(health_timeout),
                timeout: Duration::from_secs(upstream_timeout),
            },
            port,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: &Option<String>, name: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AdvisorError::Config(format!("{} has an invalid value: {}", name, raw))),
        None => Ok(default),
    }
}
