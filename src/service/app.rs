//! Main application state
//!
//! This module contains the AppState that wires configuration, storage, the
//! waitlist service and metrics together for the HTTP layer.

use crate::config::{validate_config, AppConfig};
use crate::metrics::MetricsCollector;
use crate::store::{build_store, KeyValueStore};
use crate::waitlist::WaitlistService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {message}")]
    Storage { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Main application state shared by all request handlers
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Waitlist read-modify-write service
    waitlist: Arc<WaitlistService>,

    /// Metrics collector exposed on /metrics
    metrics: Arc<MetricsCollector>,

    /// Time the state was created
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Initialize the application, building the configured store
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!(
            "Initializing {} with {} storage",
            config.service.name, config.storage.backend
        );

        validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let store = build_store(&config.storage).map_err(|e| ServiceError::Storage {
            message: e.to_string(),
        })?;

        Self::with_store(config, store)
    }

    /// Initialize the application over an existing store
    pub fn with_store(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ServiceError> {
        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let waitlist = Arc::new(
            WaitlistService::new(store)
                .with_key(config.storage.waitlist_key.clone())
                .with_metrics(metrics.clone()),
        );

        Ok(Self {
            config,
            waitlist,
            metrics,
            started_at: Utc::now(),
        })
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the waitlist service
    pub fn waitlist(&self) -> Arc<WaitlistService> {
        self.waitlist.clone()
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Time the service started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Seconds since the service started
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
