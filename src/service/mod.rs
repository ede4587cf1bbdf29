//! Service layer for the registration service
//!
//! This module contains the shared application state and health reporting.

pub mod app;
pub mod health;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
