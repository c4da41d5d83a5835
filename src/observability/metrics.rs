//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relayed requests by outcome
//! - `relay_request_duration_seconds` (histogram): end-to-end latency
//! - `relay_upstream_status_total` (counter): upstream answers by status
//! - `relay_response_shape_total` (counter): diagnostic body classification
//!
//! Without an installed recorder every call is a no-op.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished relay request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_status(status: u16) {
    metrics::counter!("relay_upstream_status_total", "status" => status.to_string()).increment(1);
}

pub fn record_response_shape(shape: &'static str) {
    metrics::counter!("relay_response_shape_total", "shape" => shape).increment(1);
}
