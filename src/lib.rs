//! Pesto Registration - waitlist registration microservice
//!
//! This crate accepts user registrations over HTTP, appends them to a
//! waitlist persisted as one JSON value in a key/value store, and lists the
//! pending registrants in registration order.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod store;
pub mod types;
pub mod waitlist;

// Re-export commonly used types and traits
pub use error::{RegistrationError, Result};
pub use types::*;

// Re-export key components
pub use api::{create_router, HttpServer};
pub use store::{FileStore, InMemoryStore, KeyValueStore};
pub use waitlist::WaitlistService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
