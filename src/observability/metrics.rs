//! Metrics collection and exposition.
//!
//! # Metrics
//! - `health_check_ticks_total` (counter): ticks by check and outcome
//! - `health_check_recoveries_total` (counter): recovery runs by check and result (ok, failed, crashed)
//! - `health_check_status` (gauge): 1=healthy, 0=unhealthy
//! - `database_reconnects_total` (counter): reconnect attempts by result
//! - `http_requests_total` (counter): requests by method, status
//! - `http_request_duration_seconds` (histogram): latency distribution
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_health_tick(check: &str, outcome: &'static str) {
    counter!("health_check_ticks_total", "check" => check.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_health_status(check: &str, healthy: bool) {
    gauge!("health_check_status", "check" => check.to_string()).set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_recovery(check: &str, result: &'static str) {
    counter!("health_check_recoveries_total", "check" => check.to_string(), "result" => result)
        .increment(1);
}

pub fn record_reconnect(result: &'static str) {
    counter!("database_reconnects_total", "result" => result).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}
