//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define redirect metrics (responses, reloads, table size)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `redirectd_requests_total` (counter): responses by status code
//! - `redirectd_reloads_total` (counter): rule reload attempts by outcome
//! - `redirectd_rules` (gauge): rules in the active table
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - The exporter runs its own listener; scrapes never touch the
//!   redirect hot path

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(address: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()?;

    describe_counter!(
        "redirectd_requests_total",
        "Responses grouped by status code"
    );
    describe_counter!(
        "redirectd_reloads_total",
        "Rule reload attempts grouped by outcome"
    );
    describe_gauge!("redirectd_rules", "Rules in the active table");

    tracing::info!(address = %address, "metrics endpoint listening");
    Ok(())
}

/// Count one response with its status code.
pub fn record_request(status: u16) {
    counter!("redirectd_requests_total", "status" => status.to_string()).increment(1);
}

/// Count one rule reload attempt.
pub fn record_reload(outcome: &'static str) {
    counter!("redirectd_reloads_total", "outcome" => outcome).increment(1);
}

/// Publish the size of the active rule table.
pub fn record_rule_count(count: usize) {
    gauge!("redirectd_rules").set(count as f64);
}
