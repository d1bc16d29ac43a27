//! Metrics collection and exposition.
//!
//! # Metrics
//! - `connectivity_state` (gauge): 0=online, 1=degraded, 2=offline
//! - `connectivity_transitions_total` (counter): committed transitions by from, to
//! - `connectivity_probes_total` (counter): recovery probes by outcome
//! - `connectivity_consecutive_failures` (gauge): current failure streak

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::connectivity::ConnectivityState;

/// Start the Prometheus scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_state(state: ConnectivityState) {
    metrics::gauge!("connectivity_state").set(state as u8 as f64);
}

pub fn record_transition(from: ConnectivityState, to: ConnectivityState) {
    metrics::counter!("connectivity_transitions_total", "from" => from.as_str(), "to" => to.as_str())
        .increment(1);
    record_state(to);
}

pub fn record_probe(reachable: bool) {
    let outcome = if reachable { "reachable" } else { "unreachable" };
    metrics::counter!("connectivity_probes_total", "outcome" => outcome).increment(1);
}

pub fn record_consecutive_failures(count: u32) {
    metrics::gauge!("connectivity_consecutive_failures").set(count as f64);
}
