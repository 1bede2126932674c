//! JSON file-backed key-value store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

/// A store persisted as a single JSON object on disk.
///
/// The whole object is loaded on open and rewritten on every change
/// (write to a temporary sibling, then rename). A missing file starts
/// empty; an unreadable or malformed file is logged and also starts empty
/// so a corrupt state file never blocks ordering.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    inner: Arc<JsonFileStoreInner>,
}

#[derive(Debug)]
struct JsonFileStoreInner {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let entries = load_entries(&path);
        debug!(path = %path.display(), keys = entries.len(), "Opened storage file");

        Ok(Self {
            inner: Arc::new(JsonFileStoreInner {
                path,
                entries: Mutex::new(entries),
            }),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.inner.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.inner.path)?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read storage file, starting empty");
            return BTreeMap::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Malformed storage file, starting empty");
        BTreeMap::new()
    })
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .inner
            .entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut entries = self
            .inner
            .entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?;
        let previous = entries.insert(key.to_owned(), value);

        if let Err(e) = self.flush(&entries) {
            // Keep memory and disk in agreement
            match previous {
                Some(old) => entries.insert(key.to_owned(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .inner
            .entries
            .lock()
            .map_err(|_| StorageError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}
