//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devserve_requests_total` (counter): requests by method and status
//! - `devserve_request_duration_seconds` (histogram): time to response head
//! - `devserve_not_found_total` (counter): requests that fell into the 404 chain
//! - `devserve_listeners` (gauge): bound listeners
//!
//! Without an installed recorder the macros are no-ops, so recording is
//! unconditional and the exporter is opt-in.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("devserve_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    metrics::histogram!("devserve_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

/// Record a request that could not be served from disk.
pub fn record_not_found() {
    metrics::counter!("devserve_not_found_total").increment(1);
}

/// Record the number of bound listeners.
pub fn record_listeners(count: usize) {
    metrics::gauge!("devserve_listeners").set(count as f64);
}
