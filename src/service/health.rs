//! Health check and service statistics
//!
//! This module checks the storage backend and reports the state of the
//! registration service for the health and stats endpoints.

use crate::service::app::AppState;
use crate::store::KeyValueStore;
use crate::waitlist::decode_waitlist;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional error message if not healthy
    pub message: Option<String>,
    /// Check duration in milliseconds
    pub duration_ms: u64,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Registrants currently on the waitlist
    pub pending: usize,
    /// Seconds since the service started
    pub uptime_seconds: i64,
}

impl HealthCheck {
    /// Perform a full health check of the service
    pub async fn check(app_state: Arc<AppState>) -> Self {
        let (storage_check, pending) = Self::check_storage(&app_state).await;
        let status = storage_check.status;

        let stats = ServiceStats {
            pending,
            uptime_seconds: app_state.uptime_seconds(),
        };

        app_state
            .metrics()
            .update_health_status(status != HealthStatus::Unhealthy);

        HealthCheck {
            status,
            service: app_state.config().service.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            checks: vec![storage_check],
            stats,
        }
    }

    /// Readiness check - the store must be reachable
    pub async fn readiness_check(app_state: Arc<AppState>) -> HealthStatus {
        Self::check_storage(&app_state).await.0.status
    }

    /// Read and decode the waitlist value once, returning the component
    /// result and the number of decoded registrants.
    ///
    /// Goes straight to the store so a health poll never counts as a
    /// client-visible decode failure.
    async fn check_storage(app_state: &AppState) -> (ComponentCheck, usize) {
        let start = std::time::Instant::now();
        let waitlist = app_state.waitlist();

        let (status, message, pending) = match waitlist.store().get(waitlist.key()).await {
            Ok(None) => (HealthStatus::Healthy, None, 0),
            Ok(Some(raw)) => match decode_waitlist(&raw) {
                Ok(users) => (HealthStatus::Healthy, None, users.len()),
                Err(e) => {
                    debug!("Stored waitlist failed to decode during health check: {}", e);
                    (
                        HealthStatus::Degraded,
                        Some(format!("Stored waitlist is not decodable: {}", e)),
                        0,
                    )
                }
            },
            Err(e) => {
                error!("Storage health check failed: {}", e);
                (
                    HealthStatus::Unhealthy,
                    Some(format!("Storage read failed: {}", e)),
                    0,
                )
            }
        };

        let check = ComponentCheck {
            name: "storage".to_string(),
            status,
            message,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        (check, pending)
    }
}
