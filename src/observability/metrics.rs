//! Metrics collection and exposition.
//!
//! # Metrics
//! - `fanout_requests_total` (counter): API requests by method, status
//! - `fanout_request_duration_seconds` (histogram): API latency
//! - `fanout_service_outcomes_total` (counter): per-service results by outcome

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

use crate::fanout::types::SetError;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished API request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "fanout_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("fanout_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one per-service outcome; `None` means success.
pub fn record_outcome(error: Option<&SetError>) {
    let outcome = error.map_or("success", SetError::kind);
    metrics::counter!("fanout_service_outcomes_total", "outcome" => outcome).increment(1);
}
