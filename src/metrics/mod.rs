//! Metrics for the registration service
//!
//! Prometheus counters and gauges for registrations, waitlist reads and HTTP
//! traffic. Exposed by the `/metrics` endpoint in [`crate::api`].

pub mod collector;

pub use collector::{HttpMetrics, MetricsCollector, WaitlistMetrics};
