//! # Observability Infrastructure
//!
//! Structured logging and Prometheus metrics for the dealership application.

pub mod http_tracing;
pub mod logging;
pub mod metrics;

pub use http_tracing::track_http_requests;
pub use logging::{init_logging, log_config_info};
pub use metrics::{init_metrics, MetricsRecorder};

use crate::config::ObservabilityConfig;
use crate::errors::Result;
use ::tracing::info;
use metrics_exporter_prometheus::PrometheusHandle;

/// Initialize logging and, when enabled, metrics.
///
/// Returns the Prometheus handle backing the `/metrics` route.
pub async fn init_observability(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>> {
    init_logging(config)?;

    let handle = init_metrics(config).await?;

    info!(
        log_level = %config.log_level,
        json_logging = config.json_logging,
        metrics_enabled = %config.enable_metrics,
        "Observability initialized successfully"
    );

    Ok(handle)
}
