//! File-backed key/value store
//!
//! Each key maps to one file inside the data directory. Writes go to a
//! temporary sibling first and are renamed into place, so a reader sees
//! either the old value or the new one, never a partial write.

use super::{validate_key, KeyValueStore, StoreResult};
use crate::error::RegistrationError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Durable store keeping one file per key
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    tmp_counter: AtomicU64,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| {
            RegistrationError::storage(format!(
                "Failed to create data directory {}: {}",
                root.display(),
                e
            ))
        })?;

        info!("File store opened at {}", root.display());

        Ok(Self {
            root,
            tmp_counter: AtomicU64::new(0),
        })
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    // Temp names start with a dot, which validate_key never allows, so they
    // cannot collide with a real key.
    fn tmp_path_for(&self, key: &str) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{}.tmp", key, std::process::id(), n))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored value for key '{}'", key);
                Ok(None)
            }
            Err(e) => Err(RegistrationError::storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp_path = self.tmp_path_for(key);

        if let Err(e) = tokio::fs::write(&tmp_path, value).await {
            return Err(RegistrationError::storage(format!(
                "Failed to write {}: {}",
                tmp_path.display(),
                e
            )));
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(RegistrationError::storage(format!(
                "Failed to replace {}: {}",
                path.display(),
                e
            )));
        }

        debug!("Stored {} bytes under key '{}'", value.len(), key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        assert_eq!(store.get("waitlist").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.put("waitlist", r#"[{"name":"Alice"}]"#).await.unwrap();

        assert_eq!(
            store.get("waitlist").await.unwrap().as_deref(),
            Some(r#"[{"name":"Alice"}]"#)
        );
        assert!(dir.path().join("waitlist").is_file());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.put("waitlist", "[]").await.unwrap();
            store.put("waitlist", r#"[{"name":"Bob"}]"#).await.unwrap();
        }

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("waitlist").await.unwrap().as_deref(),
            Some(r#"[{"name":"Bob"}]"#)
        );
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        for i in 0..5 {
            store.put("waitlist", &format!("[{}]", i)).await.unwrap();
        }

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["waitlist".to_string()]);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("inner")).unwrap();

        let result = store.put("../outside", "[]").await;
        assert!(matches!(
            result,
            Err(RegistrationError::InvalidKey { .. })
        ));
        assert!(!dir.path().join("outside").exists());
    }
}
