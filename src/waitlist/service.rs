//! Waitlist service
//!
//! Appends registrations to the stored waitlist and reads it back. Appends
//! run one at a time under a write lock, so concurrent registrations never
//! overwrite each other. Reads are fail-open: a missing or undecodable value
//! reads as an empty waitlist.

use crate::error::RegistrationError;
use crate::metrics::MetricsCollector;
use crate::store::KeyValueStore;
use crate::types::{User, Waitlist, WAITLIST_KEY};
use crate::waitlist::codec::{decode_waitlist, encode_waitlist};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Outcome of loading the stored waitlist
enum Loaded {
    Present(Waitlist),
    Missing,
    Corrupt(serde_json::Error),
}

/// Service owning the waitlist read-modify-write cycle
pub struct WaitlistService {
    store: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl WaitlistService {
    /// Create a service over `store` using the default waitlist key
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: WAITLIST_KEY.to_string(),
            write_lock: Mutex::new(()),
            metrics: None,
        }
    }

    /// Use a different storage key for the waitlist
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Report registrations and decode failures to `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Storage key holding the waitlist
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying key/value store
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    /// Append `user` to the end of the waitlist.
    ///
    /// Linearizable with respect to other `append` calls on this service.
    /// A corrupt stored value is replaced by a list holding only `user`.
    /// Store read/write errors and encode errors are returned and the stored
    /// waitlist is left as it was.
    pub async fn append(&self, user: User) -> Result<(), RegistrationError> {
        let _guard = self.write_lock.lock().await;
        let started = Instant::now();

        let result = self.append_locked(user).await;

        match (&result, &self.metrics) {
            (Ok(size), Some(metrics)) => metrics.record_registration(*size, started.elapsed()),
            (Err(_), Some(metrics)) => metrics.record_registration_failure(),
            _ => {}
        }

        result.map(|_| ())
    }

    async fn append_locked(&self, user: User) -> Result<usize, RegistrationError> {
        let mut waitlist = match self.load().await? {
            Loaded::Present(waitlist) => waitlist,
            Loaded::Missing => Vec::new(),
            Loaded::Corrupt(e) => {
                warn!(
                    "Replacing undecodable waitlist under key '{}': {}",
                    self.key, e
                );
                Vec::new()
            }
        };

        waitlist.push(user);

        let encoded = encode_waitlist(&waitlist).map_err(|e| {
            error!("Failed to encode waitlist of {} entries: {}", waitlist.len(), e);
            e
        })?;

        self.store.put(&self.key, &encoded).await.map_err(|e| {
            error!("Failed to store waitlist under key '{}': {}", self.key, e);
            e
        })?;

        info!("Registration appended, waitlist now has {} entries", waitlist.len());
        Ok(waitlist.len())
    }

    /// Read the whole waitlist in registration order.
    ///
    /// Never fails: a missing key, an undecodable value or a store error all
    /// read as an empty waitlist.
    pub async fn read_all(&self) -> Waitlist {
        let waitlist = match self.load().await {
            Ok(Loaded::Present(waitlist)) => {
                debug!("Read {} waitlist entries", waitlist.len());
                waitlist
            }
            Ok(Loaded::Missing) => {
                debug!("No waitlist stored under key '{}'", self.key);
                Vec::new()
            }
            Ok(Loaded::Corrupt(e)) => {
                warn!(
                    "Stored waitlist under key '{}' is not a valid user list, reading as empty: {}",
                    self.key, e
                );
                Vec::new()
            }
            Err(e) => {
                error!("Failed to read waitlist, reading as empty: {}", e);
                Vec::new()
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.update_waitlist_size(waitlist.len());
        }
        waitlist
    }

    async fn load(&self) -> Result<Loaded, RegistrationError> {
        let raw = match self.store.get(&self.key).await? {
            Some(raw) => raw,
            None => return Ok(Loaded::Missing),
        };

        match decode_waitlist(&raw) {
            Ok(waitlist) => Ok(Loaded::Present(waitlist)),
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_decode_failure();
                }
                Ok(Loaded::Corrupt(e))
            }
        }
    }
}
