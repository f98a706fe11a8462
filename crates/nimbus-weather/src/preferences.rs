//! Key-value preferences used to remember the last searched city across restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Key under which the last selected city is stored.
pub const CITY_NAME_KEY: &str = "city_name";

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Preferences I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preferences file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Asynchronous string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    /// Returns an error when the value cannot be persisted.
    async fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError>;

    /// # Errors
    /// Returns an error when the store cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, PreferencesError>;
}

/// Preferences persisted as a flat JSON object on disk.
pub struct FilePreferences {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process.
    write_lock: tokio::sync::Mutex<()>,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>, PreferencesError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(HashMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyValueStore for FilePreferences {
    async fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        let _guard = self.write_lock.lock().await;

        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write to a sibling file, then rename into place
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&values)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Stored preference {} in {:?}", key, self.path);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        Ok(self.read_all().await?.remove(key))
    }
}

/// In-process store, lost on exit.
#[derive(Default)]
pub struct MemoryPreferences {
    values: parking_lot::Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryPreferences {
    async fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PreferencesError> {
        Ok(self.values.lock().get(key).cloned())
    }
}

/// Typed view over a [`KeyValueStore`] for the last selected city.
#[derive(Clone)]
pub struct CityPreferences {
    store: Arc<dyn KeyValueStore>,
}

impl CityPreferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// # Errors
    /// Propagates store failures.
    pub async fn save_city(&self, city: &str) -> Result<(), PreferencesError> {
        self.store.set(CITY_NAME_KEY, city).await
    }

    /// # Errors
    /// Propagates store failures.
    pub async fn city(&self) -> Result<Option<String>, PreferencesError> {
        self.store.get(CITY_NAME_KEY).await
    }
}
