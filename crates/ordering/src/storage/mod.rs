//! Key-value persistence for cart, profile, and rotation state.
//!
//! The page keeps its state in a string-keyed store holding JSON values,
//! so a reload restores the previous cart. Two stores are provided:
//!
//! - [`MemoryStore`] - in-process map, used by tests and embedders
//! - [`JsonFileStore`] - one JSON object on disk, used by the CLI
//!
//! Writes are synchronous and complete before the caller returns.
//! Callers decide whether a failure matters; the cart and rotation only
//! log it and keep their in-memory state.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from the key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized or deserialized.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store is full.
    #[error("storage quota exceeded: {used} of {limit} bytes")]
    QuotaExceeded {
        /// Bytes the store would hold after the write.
        used: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A previous writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string-keyed store of JSON-serialized values.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a raw value under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails or exceeds the quota.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Load and deserialize a JSON value.
///
/// Returns `Ok(None)` when nothing is stored under `key`.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the stored text is not valid
/// JSON for `T`, or any error from the underlying store.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and store a JSON value.
///
/// # Errors
///
/// Returns `StorageError` if serialization or the write fails.
pub fn save_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}

/// Storage keys used by the ordering page.
///
/// These match the keys the page has always written, so state saved by
/// earlier versions hydrates unchanged.
pub mod keys {
    /// Cart line items.
    pub const CART: &str = "pfgChapatiCart";

    /// Customer profile form fields.
    pub const CUSTOMER_PROFILE: &str = "pfgChapatiCustomer";

    /// Recently used WhatsApp contact numbers.
    pub const USED_CONTACTS: &str = "pfgChapatiUsedContacts";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json_missing_key() {
        let store = MemoryStore::new();
        let value: Option<Vec<String>> = load_json(&store, "missing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_save_then_load_json() {
        let store = MemoryStore::new();
        save_json(&store, "numbers", &vec!["a", "b"]).unwrap();

        let value: Option<Vec<String>> = load_json(&store, "numbers").unwrap();
        assert_eq!(value.unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_load_json_malformed() {
        let store = MemoryStore::new();
        store.set("broken", "{not json".to_string()).unwrap();

        let result: Result<Option<Vec<String>>, _> = load_json(&store, "broken");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
