//! Test fixtures and store implementations for integration testing

use async_trait::async_trait;
use pesto_registration::config::AppConfig;
use pesto_registration::service::AppState;
use pesto_registration::store::{InMemoryStore, KeyValueStore, StoreResult};
use pesto_registration::RegistrationError;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory store whose writes can be made to fail on demand
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    fail_puts: AtomicBool,
    put_count: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail (or succeed again)
    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes
    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(RegistrationError::storage("simulated write failure"));
        }
        self.inner.put(key, value).await?;
        self.put_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Build application state over the given store with default configuration
pub fn app_state_with(store: Arc<dyn KeyValueStore>) -> Arc<AppState> {
    Arc::new(AppState::with_store(AppConfig::default(), store).expect("Failed to build app state"))
}
