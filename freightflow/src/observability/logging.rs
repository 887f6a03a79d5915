//! `tracing-subscriber` installation.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::errors::ConfigError;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.filter`. Fails if a subscriber is
/// already installed or the filter directive is invalid.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter)
            .map_err(|e| ConfigError::invalid_value("logging.filter", e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| ConfigError::Logging(e.to_string()))
}
