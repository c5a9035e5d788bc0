//! Key-value persistence substrate for the error store.
//!
//! The store only needs `get`/`set`/`remove` on two fixed keys, so any
//! platform storage can be plugged in by implementing [`KeyValueStorage`].

use crate::error::{RecoveryError, RecoveryResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Storage abstraction for the serialized error history.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> RecoveryResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> RecoveryResult<()>;
    async fn remove(&self, key: &str) -> RecoveryResult<()>;
}

/// Process-local storage. History does not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> RecoveryResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> RecoveryResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> RecoveryResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// File-backed storage: one file per key inside `base_dir`.
///
/// # Example
/// ```no_run
/// use recovery_engine::storage::{FileStorage, KeyValueStorage};
///
/// # async fn example() -> recovery_engine::RecoveryResult<()> {
/// let storage = FileStorage::new("/var/lib/myapp/errors");
/// storage.set("error_reports", "[]").await?;
/// assert_eq!(storage.get("error_reports").await?.as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_key(key)))
    }
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn get(&self, key: &str) -> RecoveryResult<Option<String>> {
        match tokio::fs::read_to_string(self.key_path(key)).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(RecoveryError::storage("get", key, err.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> RecoveryResult<()> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|err| RecoveryError::storage("set", key, err.to_string()))?;

        // A crash mid-write leaves the previous file intact.
        let path = self.key_path(key);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, value)
            .await
            .map_err(|err| RecoveryError::storage("set", key, err.to_string()))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|err| RecoveryError::storage("set", key, err.to_string()))
    }

    async fn remove(&self, key: &str) -> RecoveryResult<()> {
        match tokio::fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(RecoveryError::storage("remove", key, err.to_string())),
        }
    }
}

fn normalize_key(key: &str) -> String {
    let normalized: String = key
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if normalized.is_empty() {
        "default".to_string()
    } else {
        normalized
    }
}
