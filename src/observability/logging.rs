//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{AppConfig, ObservabilityConfig};
use crate::errors::{DealershipError, Result};

/// Create a tracing span for request tracking.
///
/// ```rust,ignore
/// let span = request_span!("GET", "/inv/detail/3");
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            account_id = tracing::field::Empty
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            account_id = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Fails if a subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            DealershipError::config(format!("Invalid log level '{}': {}", config.log_level, e))
        })?;

    let installed = if config.json_logging {
        fmt().json().with_env_filter(filter).with_target(true).with_current_span(true).try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };

    installed.map_err(|e| DealershipError::config(format!("Failed to install logger: {}", e)))
}

/// Log configuration at startup
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        server_address = %config.server.bind_address(),
        environment = ?config.environment,
        database = %crate::storage::sanitize_url(&config.database.url),
        secure_cookies = config.environment.secure_cookies(),
        session_ttl_seconds = config.session.ttl_seconds,
        metrics_enabled = %config.observability.enable_metrics,
        "Dealership configuration"
    );
}
