use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::storage::Storage;
use crate::error::StorageError;

/// Storage backed by one JSON object file mapping keys to string values.
/// The whole map is rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// `$HOME/.local/share/pomodoro_timer/storage.json`
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let home = std::env::var_os("HOME").ok_or(StorageError::NoDataDir)?;
        Ok(PathBuf::from(home).join(".local/share/pomodoro_timer/storage.json"))
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let values = Self::read_values(&path);
        debug!("Opened store {} with {} keys", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(path: &Path) -> BTreeMap<String, String> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read store {}: {}", path.display(), e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(values) => values,
            Err(e) => {
                warn!(
                    "Store {} is malformed, starting empty: {}",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    fn flush(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl Storage for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            warn!("Failed to persist '{}': {}", key, e);
        }
    }
}
