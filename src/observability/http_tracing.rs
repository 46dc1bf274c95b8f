//! # HTTP Request Metrics Middleware
//!
//! Counts requests and records their latency. Request spans themselves come
//! from tower-http's `TraceLayer`.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use super::metrics;

/// Record method, status and latency of every request.
pub async fn track_http_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed = start.elapsed();
    tracing::debug!(status, elapsed_ms = elapsed.as_millis() as u64, "request completed");
    metrics::record_http_request(&method, status, elapsed.as_secs_f64()).await;

    response
}
