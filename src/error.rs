//! Error types for the registration service
//!
//! Setup and configuration paths use anyhow; the waitlist and storage layers
//! report the specific failures below so the HTTP layer can map them.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific registration scenarios
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Storage operation failed: {message}")]
    Storage { message: String },

    #[error("Waitlist serialization failed: {message}")]
    Serialization { message: String },

    #[error("Invalid storage key: {key:?}")]
    InvalidKey { key: String },
}

impl RegistrationError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
