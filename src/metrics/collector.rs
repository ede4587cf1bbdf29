//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the registration service
//! using Prometheus metrics.

use anyhow::Result;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the registration service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Waitlist-related metrics
    waitlist_metrics: WaitlistMetrics,

    /// HTTP and service-level metrics
    http_metrics: HttpMetrics,
}

/// Waitlist-related metrics
#[derive(Clone)]
pub struct WaitlistMetrics {
    /// Registrations persisted successfully
    pub registrations_total: IntCounter,

    /// Registrations that could not be persisted
    pub registration_failures_total: IntCounter,

    /// Stored waitlist values that failed to decode and were read as empty
    pub decode_failures_total: IntCounter,

    /// Number of pending registrants after the last read or write
    pub waitlist_size: IntGauge,

    /// Time spent in the append read-modify-write cycle
    pub append_duration: Histogram,
}

/// HTTP and service-level metrics
#[derive(Clone)]
pub struct HttpMetrics {
    /// Requests served, by endpoint and status code
    pub requests_total: IntCounterVec,

    /// Health check status (0=unhealthy, 1=healthy)
    pub health_status: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let waitlist_metrics = WaitlistMetrics::new(&registry)?;
        let http_metrics = HttpMetrics::new(&registry)?;

        Ok(Self {
            registry,
            waitlist_metrics,
            http_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get waitlist metrics
    pub fn waitlist(&self) -> &WaitlistMetrics {
        &self.waitlist_metrics
    }

    /// Get HTTP metrics
    pub fn http(&self) -> &HttpMetrics {
        &self.http_metrics
    }

    /// Record a persisted registration and the resulting waitlist size
    pub fn record_registration(&self, waitlist_size: usize, duration: Duration) {
        self.waitlist_metrics.registrations_total.inc();
        self.waitlist_metrics.waitlist_size.set(waitlist_size as i64);
        self.waitlist_metrics
            .append_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a registration that failed to persist
    pub fn record_registration_failure(&self) {
        self.waitlist_metrics.registration_failures_total.inc();
    }

    /// Record a stored waitlist value that could not be decoded
    pub fn record_decode_failure(&self) {
        self.waitlist_metrics.decode_failures_total.inc();
    }

    /// Update the pending registrant gauge
    pub fn update_waitlist_size(&self, size: usize) {
        self.waitlist_metrics.waitlist_size.set(size as i64);
    }

    /// Record an HTTP request
    pub fn record_request(&self, endpoint: &str, status: u16) {
        self.http_metrics
            .requests_total
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }

    /// Update health status
    pub fn update_health_status(&self, healthy: bool) {
        self.http_metrics
            .health_status
            .set(if healthy { 1 } else { 0 });
    }
}

impl WaitlistMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let registrations_total = IntCounter::new(
            "pesto_registrations_total",
            "Total registrations persisted to the waitlist",
        )?;
        registry.register(Box::new(registrations_total.clone()))?;

        let registration_failures_total = IntCounter::new(
            "pesto_registration_failures_total",
            "Total registrations that failed to persist",
        )?;
        registry.register(Box::new(registration_failures_total.clone()))?;

        let decode_failures_total = IntCounter::new(
            "pesto_waitlist_decode_failures_total",
            "Total stored waitlist values that failed to decode",
        )?;
        registry.register(Box::new(decode_failures_total.clone()))?;

        let waitlist_size =
            IntGauge::new("pesto_waitlist_size", "Number of pending registrants")?;
        registry.register(Box::new(waitlist_size.clone()))?;

        let append_duration = Histogram::with_opts(
            HistogramOpts::new(
                "pesto_waitlist_append_duration_seconds",
                "Time spent appending a registration to the waitlist",
            )
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(append_duration.clone()))?;

        Ok(Self {
            registrations_total,
            registration_failures_total,
            decode_failures_total,
            waitlist_size,
            append_duration,
        })
    }
}

impl HttpMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("pesto_http_requests_total", "Total HTTP requests served"),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let health_status =
            IntGauge::new("pesto_health_status", "Health status (0=unhealthy, 1=healthy)")?;
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            requests_total,
            health_status,
        })
    }
}
