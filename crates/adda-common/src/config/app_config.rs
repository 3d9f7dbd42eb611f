//! Client configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub engagement: EngagementSettings,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Remote engagement API settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without trailing slash, e.g. `https://api.adda.app/api`
    pub base_url: String,
    /// Per-request timeout; elapsed requests surface as network errors
    pub request_timeout: Duration,
    /// Static bearer token for headless use (CLI); `None` means signed out
    pub access_token: Option<String>,
}

/// Engagement view-model settings
#[derive(Debug, Clone)]
pub struct EngagementSettings {
    /// How often summaries re-fetch authoritative counts
    pub poll_interval: Duration,
    /// How many reaction badges a summary shows
    pub summary_top_n: usize,
}

impl Default for EngagementSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
            summary_top_n: default_summary_top_n(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "adda".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_summary_top_n() -> usize {
    3
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if `ADDA_API_BASE_URL` is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("ADDA_API_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingVar("ADDA_API_BASE_URL"))?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue("ADDA_API_BASE_URL", base_url));
        }

        let env = match lookup("APP_ENV") {
            Some(s) => Environment::parse(&s).ok_or(ConfigError::InvalidValue("APP_ENV", s))?,
            None => Environment::default(),
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            api: ApiConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                request_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "ADDA_REQUEST_TIMEOUT_MS",
                    default_request_timeout_ms(),
                )?),
                access_token: lookup("ADDA_ACCESS_TOKEN").filter(|s| !s.is_empty()),
            },
            engagement: EngagementSettings {
                poll_interval: Duration::from_millis(parse_or(
                    &lookup,
                    "ADDA_POLL_INTERVAL_MS",
                    default_poll_interval_ms(),
                )?),
                summary_top_n: parse_or(&lookup, "ADDA_SUMMARY_TOP_N", default_summary_top_n())?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
