use crate::fs_util::write_atomic;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value preference storage.
///
/// Stands in for the OS-level settings facility: the sandbox broker keeps its
/// grant blob here and the importer keeps its schedule.
pub trait SettingsStore: Send + Sync {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn remove(&self, key: &str) -> Result<(), SettingsError>;
}

/// Typed accessors on top of [`SettingsStore`]
pub trait SettingsExt {
    /// Read and decode a value. Missing keys and values of the wrong shape both
    /// read as `None`.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T>;
    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SettingsError>;
}

impl<S: SettingsStore + ?Sized> SettingsExt for S {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Settings: ignoring malformed value for '{}': {}", key, e);
                None
            }
        }
    }

    fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SettingsError> {
        self.set_value(key, serde_json::to_value(value)?)
    }
}

/// Settings persisted as a single JSON object on disk
pub struct JsonFileSettings {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonFileSettings {
    /// Open the settings file, starting empty if it is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::read_file(&path);
        JsonFileSettings {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Map<String, Value> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Settings: no settings file at {}", path.display());
                return Map::new();
            }
            Err(e) => {
                warn!("Settings: failed to read {}: {}", path.display(), e);
                return Map::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    "Settings: {} is corrupt, starting from defaults: {}",
                    path.display(),
                    e
                );
                Map::new()
            }
        }
    }

    fn flush(&self, values: &Map<String, Value>) -> Result<(), SettingsError> {
        let json = serde_json::to_vec_pretty(values)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get_value(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set_value(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}

/// In-memory settings, never persisted
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<Map<String, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get_value(&self, key: &str) -> Option<Value> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set_value(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
        Ok(())
    }
}
