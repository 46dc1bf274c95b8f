//! # Metrics Collection
//!
//! Prometheus metrics for authentication and session activity. The exporter
//! renders into the application's own `/metrics` route.

use crate::config::ObservabilityConfig;
use crate::errors::{DealershipError, Result};
use ::tracing::info;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Arc, LazyLock};
use tokio::sync::RwLock;

/// Metrics recorder that tracks application metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Create a new metrics recorder instance
    pub fn new() -> Self {
        Self
    }

    /// Record an HTTP request
    pub fn record_http_request(&self, method: &str, status: u16, duration: f64) {
        let labels = [("method", method.to_string()), ("status", status.to_string())];
        counter!("http_requests_total", &labels).increment(1);
        histogram!("http_request_duration_seconds").record(duration);
    }

    /// Record a login attempt outcome
    pub fn record_authentication(&self, status: &str) {
        counter!("auth_authentications_total").increment(1);
        let labels = [("status", status.to_string())];
        counter!("auth_authentications_total", &labels).increment(1);
    }

    /// Record a registration attempt outcome
    pub fn record_registration(&self, status: &str) {
        let labels = [("status", status.to_string())];
        counter!("auth_registrations_total", &labels).increment(1);
    }

    /// Record an identity token being signed
    pub fn record_token_issued(&self, reason: &str) {
        let labels = [("reason", reason.to_string())];
        counter!("auth_tokens_issued_total", &labels).increment(1);
    }

    /// Record a presented identity token being rejected
    pub fn record_token_rejected(&self, reason: &str) {
        let labels = [("reason", reason.to_string())];
        counter!("auth_tokens_rejected_total", &labels).increment(1);
    }

    /// Record a session record being destroyed
    pub fn record_session_destroyed(&self) {
        counter!("sessions_destroyed_total").increment(1);
    }

    /// Record expired sessions removed by the cleanup task
    pub fn record_sessions_expired(&self, count: u64) {
        counter!("sessions_expired_total").increment(count);
    }

    /// Register baseline auth metrics so Prometheus exports appear before events occur.
    pub fn register_auth_metrics(&self) {
        describe_counter!(
            "auth_authentications_total",
            Unit::Count,
            "Login attempts grouped by outcome"
        );
        describe_counter!(
            "auth_registrations_total",
            Unit::Count,
            "Registration attempts grouped by outcome"
        );
        describe_counter!(
            "auth_tokens_issued_total",
            Unit::Count,
            "Identity tokens signed, by reason"
        );
        describe_counter!(
            "auth_tokens_rejected_total",
            Unit::Count,
            "Identity tokens rejected, by reason"
        );
        describe_counter!("sessions_destroyed_total", Unit::Count, "Sessions ended at logout");
        describe_counter!(
            "sessions_expired_total",
            Unit::Count,
            "Expired sessions removed by the cleanup task"
        );
        describe_histogram!(
            "http_request_duration_seconds",
            Unit::Seconds,
            "Duration of HTTP request handling"
        );

        const STATUSES: &[&str] = &["success", "invalid_credentials", "invalid_input", "error"];
        for status in STATUSES {
            counter!("auth_authentications_total", "status" => *status).absolute(0);
        }
        counter!("sessions_destroyed_total").absolute(0);
    }
}

/// Global metrics recorder instance
static METRICS: LazyLock<Arc<RwLock<Option<MetricsRecorder>>>> =
    LazyLock::new(|| Arc::new(RwLock::new(None)));

/// Initialize metrics collection and install the Prometheus recorder.
///
/// Returns the handle used to render `/metrics`, or `None` when disabled.
pub async fn init_metrics(config: &ObservabilityConfig) -> Result<Option<PrometheusHandle>> {
    if !config.enable_metrics {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .add_global_label("service", crate::APP_NAME)
        .install_recorder()
        .map_err(|e| {
            DealershipError::config(format!("Failed to initialize metrics exporter: {}", e))
        })?;

    let recorder = MetricsRecorder::new();
    {
        let mut metrics = METRICS.write().await;
        *metrics = Some(recorder.clone());
    }

    recorder.register_auth_metrics();

    info!("Metrics collection initialized");

    Ok(Some(handle))
}

/// Get the global metrics recorder
pub async fn get_metrics() -> Option<MetricsRecorder> {
    METRICS.read().await.clone()
}

/// Record an HTTP request using the global metrics recorder
pub async fn record_http_request(method: &str, status: u16, duration: f64) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_http_request(method, status, duration);
    }
}

/// Record login outcome via the global recorder
pub async fn record_authentication(status: &str) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_authentication(status);
    }
}

/// Record registration outcome via the global recorder
pub async fn record_registration(status: &str) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_registration(status);
    }
}

/// Record token issuance via the global recorder
pub async fn record_token_issued(reason: &str) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_token_issued(reason);
    }
}

/// Record token rejection via the global recorder
pub async fn record_token_rejected(reason: &str) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_token_rejected(reason);
    }
}

/// Record session destruction via the global recorder
pub async fn record_session_destroyed() {
    if let Some(metrics) = get_metrics().await {
        metrics.record_session_destroyed();
    }
}

/// Record swept sessions via the global recorder
pub async fn record_sessions_expired(count: u64) {
    if let Some(metrics) = get_metrics().await {
        metrics.record_sessions_expired(count);
    }
}
