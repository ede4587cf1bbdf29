//! Key/value storage backing the waitlist
//!
//! The waitlist lives as a single string value under one key. This module
//! defines the storage interface and its in-memory and file-backed
//! implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;

use crate::config::{StorageBackend, StorageSettings};
use crate::error::RegistrationError;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type for storage operations
pub type StoreResult<T> = std::result::Result<T, RegistrationError>;

/// Trait for string key/value storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, if any
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Check that a key is usable by every backend.
///
/// Keys double as file names for [`FileStore`], so they are restricted to
/// ASCII alphanumerics plus `_`, `-` and `.`, and may not start with a dot.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(RegistrationError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// Build the store selected by the storage settings
pub fn build_store(settings: &StorageSettings) -> StoreResult<Arc<dyn KeyValueStore>> {
    match settings.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryStore::new())),
        StorageBackend::File => Ok(Arc::new(FileStore::open(&settings.data_dir)?)),
    }
}
