//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HUB_API_BASE_URL` - Base URL of the hub API (e.g. `http://localhost:8000`)
//!
//! ## Optional
//! - `HUB_STORAGE_DIR` - Directory for persisted local state
//!   (default: `<config dir>/campus-hub`)
//! - `HUB_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// File name of the persisted local state inside the storage directory.
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Hub client configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Base URL of the hub API, without a trailing slash.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Path of the JSON file holding persisted local state
    /// (tokens, dark mode flag).
    pub storage_path: PathBuf,
}

impl HubConfig {
    /// Build a configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_path: default_storage_dir().join(STORAGE_FILE_NAME),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = require_env("HUB_API_BASE_URL")?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ConfigError::InvalidEnvVar("HUB_API_BASE_URL".into(), e.to_string()))?;

        let mut config = Self::new(base_url);

        if let Ok(dir) = std::env::var("HUB_STORAGE_DIR") {
            config.storage_path = PathBuf::from(dir).join(STORAGE_FILE_NAME);
        }

        if let Ok(raw) = std::env::var("HUB_HTTP_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("HUB_HTTP_TIMEOUT_SECS".into(), e.to_string())
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Base URL rendered without a trailing slash, ready for path concat.
    #[must_use]
    pub fn base(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Default directory for persisted local state.
///
/// Falls back to the current directory when no platform config dir is
/// available (containers, stripped-down CI environments).
fn default_storage_dir() -> PathBuf {
    dirs::config_dir().map_or_else(|| PathBuf::from("."), |dir| dir.join("campus-hub"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_strips_trailing_slash() {
        let config = HubConfig::new(Url::parse("http://localhost:8000/").expect("url"));
        assert_eq!(config.base(), "http://localhost:8000");
    }

    #[test]
    fn test_defaults() {
        let config = HubConfig::new(Url::parse("http://hub.test").expect("url"));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.storage_path.ends_with(STORAGE_FILE_NAME));
    }
}
