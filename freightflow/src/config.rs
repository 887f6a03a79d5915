//! Configuration for promotion fan-out, chart resolution and logging.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ConfigError;
use crate::ports::CredentialType;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreightflowConfig {
    /// Promotion fan-out settings.
    #[serde(default)]
    pub fan_out: FanOutConfig,
    /// Chart resolution settings.
    #[serde(default)]
    pub charts: ChartConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FreightflowConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks that every value is within range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fan_out.max_concurrency == 0 {
            return Err(ConfigError::invalid_value(
                "fan_out.max_concurrency",
                "must be at least 1",
            ));
        }
        if self.charts.max_concurrency == 0 {
            return Err(ConfigError::invalid_value(
                "charts.max_concurrency",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Promotion fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutConfig {
    /// Maximum subscribers processed at once; 1 processes them in order.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    1
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl FanOutConfig {
    /// Sets the maximum concurrency, clamped to at least 1.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}

/// Chart resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Maximum subscriptions resolved at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Credential type requested for chart registries.
    #[serde(default)]
    pub credential_type: CredentialType,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            credential_type: CredentialType::default(),
        }
    }
}

impl ChartConfig {
    /// Sets the maximum concurrency, clamped to at least 1.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "freightflow=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}
