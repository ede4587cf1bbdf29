//! In-memory key/value store

use super::{validate_key, KeyValueStore, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Volatile store for development and tests; contents are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("waitlist").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = InMemoryStore::new();
        store.put("waitlist", "[]").await.unwrap();
        store.put("waitlist", r#"[{"name":"Alice"}]"#).await.unwrap();

        assert_eq!(
            store.get("waitlist").await.unwrap().as_deref(),
            Some(r#"[{"name":"Alice"}]"#)
        );
        assert_eq!(store.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_key_rejected() {
        let store = InMemoryStore::new();
        assert!(store.put("../waitlist", "[]").await.is_err());
        assert!(store.get("").await.is_err());
    }
}
