//! Health check and Prometheus metrics endpoints

use crate::service::{AppState, HealthCheck, HealthStatus};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// Root endpoint handler - shows service information
pub async fn root_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": state.config().service.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/register",
            "/api/pending",
            "/health",
            "/ready",
            "/metrics",
            "/stats"
        ]
    }))
}

/// Health check endpoint handler
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Health check requested");

    let health = HealthCheck::check(state).await;
    let code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(json!({
            "status": health.status,
            "service": health.service,
            "version": health.version,
            "pending": health.stats.pending
        })),
    )
}

/// Readiness check endpoint handler
pub async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Readiness check requested");

    match HealthCheck::readiness_check(state).await {
        HealthStatus::Healthy => (StatusCode::OK, "Ready"),
        HealthStatus::Degraded => (StatusCode::OK, "Degraded but ready"),
        HealthStatus::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
    }
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    debug!("Metrics endpoint requested");

    let registry = state.metrics().registry();
    let metric_families = registry.gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            metrics_output,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

/// Detailed service statistics endpoint handler
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Stats endpoint requested");

    let health = HealthCheck::check(state.clone()).await;
    Json(json!({
        "service": {
            "name": health.service,
            "version": health.version,
            "status": health.status,
            "started_at": state.started_at(),
            "uptime_seconds": health.stats.uptime_seconds
        },
        "waitlist": {
            "key": state.waitlist().key(),
            "backend": state.config().storage.backend,
            "pending": health.stats.pending
        },
        "components": health.checks,
        "timestamp": health.timestamp
    }))
}
