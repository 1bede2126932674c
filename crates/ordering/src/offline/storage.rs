//! Named, versioned asset caches.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use moka::future::Cache;

use super::Asset;

const MAX_ASSETS_PER_CACHE: u64 = 500;

/// A set of named caches, keyed by absolute URL.
///
/// Clones share the same caches.
#[derive(Clone, Default)]
pub struct CacheStorage {
    caches: Arc<Mutex<HashMap<String, Cache<String, Asset>>>>,
}

impl CacheStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cache called `name`, creating it if needed.
    #[must_use]
    pub fn open(&self, name: &str) -> Option<Cache<String, Asset>> {
        let mut caches = self.caches.lock().ok()?;
        let cache = caches
            .entry(name.to_string())
            .or_insert_with(|| Cache::builder().max_capacity(MAX_ASSETS_PER_CACHE).build());
        Some(cache.clone())
    }

    /// Get the cache called `name` if it exists.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Cache<String, Asset>> {
        self.caches.lock().ok()?.get(name).cloned()
    }

    /// Names of all caches, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .caches
            .lock()
            .map(|caches| caches.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Delete the cache called `name`. Returns true if it existed.
    pub fn delete(&self, name: &str) -> bool {
        let removed = self
            .caches
            .lock()
            .ok()
            .and_then(|mut caches| caches.remove(name));
        removed.is_some_and(|cache| {
            cache.invalidate_all();
            true
        })
    }
}

impl std::fmt::Debug for CacheStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStorage")
            .field("names", &self.names())
            .finish()
    }
}
