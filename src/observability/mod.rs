//! Observability subsystem.
//!
//! # Outputs
//! ```text
//! logging.rs  → tracing subscriber (pretty for dev, JSON for aggregation)
//! metrics.rs  → edge decisions, forwarded requests, session events
//!               (Prometheus scrape endpoint when enabled)
//! spans.rs    → one span per request, tagged with x-request-id
//! ```

pub mod logging;
pub mod metrics;
pub mod spans;
