//! Configuration loading and logging setup

use crate::core::error::ConfigError;
use crate::core::listing::DEFAULT_EXPIRY_WARNING_DAYS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Where the prediction service lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Base URL, without trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl ForecastConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Application configuration
///
/// Every key is optional; an empty document yields [`MarketConfig::default`].
///
/// ```yaml
/// bind_address: 0.0.0.0:3000
/// forecast:
///   base_url: http://forecast.internal:8000
///   timeout_secs: 5
/// expiry_warning_days: 60
/// seed_fixtures: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub bind_address: String,

    pub forecast: ForecastConfig,

    /// Listings expiring within this many days are flagged urgent
    pub expiry_warning_days: i64,

    /// Start with the seed catalog instead of empty collections
    pub seed_fixtures: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            forecast: ForecastConfig::default(),
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            seed_fixtures: true,
        }
    }
}

impl MarketConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: display.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&content, Some(display))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Self::parse(yaml, None)
    }

    fn parse(yaml: &str, file: Option<String>) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as unit, not as an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            file,
            message: e.to_string(),
        })
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_directive` (for example
/// `"surplus_market=debug,tower_http=info"`) is used.
pub fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarketConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:3000");
        assert_eq!(config.forecast.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.forecast.timeout(), Duration::from_secs(10));
        assert_eq!(config.expiry_warning_days, 90);
        assert!(config.seed_fixtures);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(
            MarketConfig::from_yaml_str("").unwrap(),
            MarketConfig::default()
        );
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let yaml = r#"
forecast:
  timeout_secs: 3
seed_fixtures: false
"#;
        let config = MarketConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.forecast.timeout_secs, 3);
        assert_eq!(config.forecast.base_url, "http://127.0.0.1:8000");
        assert!(!config.seed_fixtures);
        assert_eq!(config.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = MarketConfig::from_yaml_str("expiry_warning_days: [soon]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { file: None, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = MarketConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
