//! Metrics collection and exposition.
//!
//! # Metrics
//! - `edge_decisions_total` (counter): router decisions by kind
//! - `gateway_requests_total` (counter): forwarded requests by method, status
//! - `gateway_request_duration_seconds` (histogram): upstream latency
//! - `session_events_total` (counter): issue/rotate/revoke/expired
//! - `sessions_active` (gauge): stored access tokens
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Prometheus exporter is opt-in via config

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::routing::DecisionKind;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_decision(kind: DecisionKind) {
    counter!("edge_decisions_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_session_event(event: &'static str) {
    counter!("session_events_total", "event" => event).increment(1);
}

pub fn record_active_sessions(count: usize) {
    gauge!("sessions_active").set(count as f64);
}
