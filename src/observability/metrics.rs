//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): proxied requests by method, status, service
//! - `gateway_request_duration_seconds` (histogram): proxy round-trip latency
//! - `imdb_retries_total` (counter): backoff sleeps taken by the IMDB client
//! - `imdb_status_checks_total` (counter): liveness pings performed
//! - `imdb_up` (gauge): 1=reachable, 0=unreachable
//!
//! Without an installed recorder every call is a no-op, so tests need no setup.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, service: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("service", service.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_retry() {
    counter!("imdb_retries_total").increment(1);
}

pub fn record_imdb_status(up: bool) {
    counter!("imdb_status_checks_total").increment(1);
    gauge!("imdb_up").set(if up { 1.0 } else { 0.0 });
}
