use crate::errors::StorageError;
use async_trait::async_trait;
use std::{collections::BTreeMap, path::Path, path::PathBuf, sync::Mutex};
use tokio::fs;
use tracing::{error, warn};

pub const STATS_KEY: &str = "health_ai_stats";
pub const DATE_KEY: &str = "health_ai_last_date";

/// String key-value persistence, the same shape as browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// All entries live in one JSON object file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|err| StorageError::Corrupt(err.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut map = self.read_map().await?;
        Ok(map.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(StorageError::Corrupt(reason)) => {
                warn!("replacing corrupt data file {}: {reason}", self.path.display());
                BTreeMap::new()
            }
            Err(err) => {
                error!("failed to read data file: {err}");
                return Err(err);
            }
        };
        map.insert(key.to_string(), value);

        let payload = serde_json::to_vec_pretty(&map)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }
}
