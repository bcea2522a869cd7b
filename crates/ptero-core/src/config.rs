//! Configuration structures for panel clients.
//!
//! [`PanelConfig`] is the deserializable, validated description of a panel
//! connection. It never serializes the API key and redacts it from `Debug`.

use crate::client::ClientConfig;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Environment variable holding the panel base URL
pub const ENV_PANEL_URL: &str = "PTERO_PANEL_URL";
/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "PTERO_API_KEY";
/// Optional environment variable overriding the queue rate
pub const ENV_RATE_PER_SECOND: &str = "PTERO_RATE_PER_SECOND";

/// Connection settings for one panel.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct PanelConfig {
    /// Panel base URL (e.g. "https://panel.example.com")
    #[validate(url)]
    pub panel_url: String,

    /// Application or client API key
    #[validate(length(min = 1))]
    #[serde(skip_serializing, default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Queued operations dispatched per second, per manager
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_rate_per_second")]
    pub rate_per_second: u32,
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_rate_per_second() -> u32 {
    crate::client::DEFAULT_RATE_PER_SECOND
}

impl fmt::Debug for PanelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelConfig")
            .field("panel_url", &self.panel_url)
            .field("api_key", &"[REDACTED]")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("rate_per_second", &self.rate_per_second)
            .finish()
    }
}

impl PanelConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL is invalid or the key is empty.
    pub fn new(panel_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            panel_url: panel_url.into(),
            api_key: api_key.into(),
            request_timeout_secs: default_request_timeout_secs(),
            rate_per_second: default_rate_per_second(),
        };
        config.check()?;
        Ok(config)
    }

    /// Load from `PTERO_PANEL_URL`, `PTERO_API_KEY` and optionally
    /// `PTERO_RATE_PER_SECOND`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when a variable is missing or invalid.
    pub fn from_env() -> Result<Self, Error> {
        let panel_url = read_env(ENV_PANEL_URL)?;
        let api_key = read_env(ENV_API_KEY)?;
        let mut config = Self::new(panel_url, api_key)?;

        if let Ok(raw) = std::env::var(ENV_RATE_PER_SECOND) {
            let rate = raw.trim().parse::<u32>().map_err(|e| {
                Error::ConfigError(format!("Invalid {ENV_RATE_PER_SECOND}: {e}"))
            })?;
            config = config.with_rate_per_second(rate);
            config.check()?;
        }

        Ok(config)
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the queue dispatch rate.
    #[must_use]
    pub const fn with_rate_per_second(mut self, rate: u32) -> Self {
        self.rate_per_second = rate;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse and validate the panel URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_panel_url(&self) -> Result<Url, Error> {
        Url::parse(&self.panel_url)
            .map_err(|e| Error::ConfigError(format!("Invalid panel URL: {e}")))
    }

    /// HTTP client settings derived from this configuration.
    #[must_use]
    pub const fn client_config(&self) -> ClientConfig {
        ClientConfig::new()
            .with_timeout(self.timeout())
            .with_rate_per_second(self.rate_per_second)
    }

    /// Re-run validation, e.g. after deserializing or using the builders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing the failed constraints.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }
}

fn read_env(key: &str) -> Result<String, Error> {
    std::env::var(key).map_err(|_| Error::ConfigError(format!("{key} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_config_new() {
        let config = PanelConfig::new("https://panel.example.com", "ptla_secret").unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.rate_per_second, 5);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_url() {
        let err = PanelConfig::new("not a url", "key").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_empty_api_key() {
        assert!(PanelConfig::new("https://panel.example.com", "").is_err());
    }

    #[test]
    fn test_builder_then_check() {
        let config = PanelConfig::new("https://panel.example.com", "key")
            .unwrap()
            .with_rate_per_second(0);
        assert!(config.check().is_err());

        let config = config.with_rate_per_second(10).with_timeout(60);
        assert!(config.check().is_ok());
        let client = config.client_config();
        assert_eq!(client.rate_per_second, 10);
        assert_eq!(client.timeout, Duration::from_secs(60));
        assert_eq!(client.dispatch_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_api_key_is_hidden() {
        let config = PanelConfig::new("https://panel.example.com", "ptla_secret").unwrap();
        assert!(!format!("{config:?}").contains("ptla_secret"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("ptla_secret"));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: PanelConfig = serde_json::from_str(
            r#"{"panel_url": "https://panel.example.com", "api_key": "key"}"#,
        )
        .unwrap();
        assert_eq!(config.rate_per_second, 5);
        assert!(config.check().is_ok());
        assert_eq!(
            config.parse_panel_url().unwrap().host_str(),
            Some("panel.example.com")
        );
    }
}
