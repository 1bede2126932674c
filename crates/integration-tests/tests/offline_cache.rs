//! Integration tests for the offline asset cache.
//!
//! A scripted fetcher stands in for the network so connectivity can be
//! switched off mid-test.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chapati_integration_tests::config;
use chapati_ordering::offline::{
    Asset, AssetFetcher, AssetRequest, AssetSource, CacheStorage, FetchError, OfflineCache,
};

/// Serves every URL it knows with 200 until taken offline.
#[derive(Clone, Default)]
struct ScriptedNetwork {
    known: Arc<Mutex<HashMap<String, &'static str>>>,
    offline: Arc<AtomicBool>,
}

impl ScriptedNetwork {
    fn serve(&self, url: &str, content_type: &'static str) {
        self.known
            .lock()
            .unwrap()
            .insert(url.to_string(), content_type);
    }

    fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }
}

impl AssetFetcher for ScriptedNetwork {
    async fn fetch(&self, request: &AssetRequest) -> Result<Asset, FetchError> {
        let network_down = || FetchError::Network {
            url: request.url.clone(),
            message: "network unreachable".to_string(),
        };
        if self.offline.load(Ordering::SeqCst) {
            return Err(network_down());
        }
        let content_type = self.known.lock().unwrap().get(&request.url).copied();
        Ok(Asset {
            url: request.url.clone(),
            status: if content_type.is_some() { 200 } else { 404 },
            content_type: content_type.map(ToString::to_string),
            body: Arc::from(request.url.as_bytes()),
        })
    }
}

/// A network serving the whole default precache manifest.
fn full_network() -> ScriptedNetwork {
    let network = ScriptedNetwork::default();
    for url in config(&[]).offline.precache {
        let absolute = if url.starts_with("http") {
            url
        } else {
            format!("http://localhost:8080{url}")
        };
        network.serve(&absolute, "text/plain");
    }
    network
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_install_then_activate_replaces_old_version() {
    let storage = CacheStorage::new();
    let old = OfflineCache::new(
        config(&[("CHAPATI_CACHE_NAME", "pfg-chapati-v1.2")]).offline,
        storage.clone(),
        full_network(),
    );
    old.install().await.unwrap();

    let current = OfflineCache::new(config(&[]).offline, storage.clone(), full_network());
    let count = current.install().await.unwrap();
    assert_eq!(count, config(&[]).offline.precache.len());
    assert_eq!(storage.names().len(), 2);

    assert_eq!(current.activate(), vec!["pfg-chapati-v1.2".to_string()]);
    assert_eq!(storage.names(), vec!["pfg-chapati-v1.3".to_string()]);
}

#[tokio::test]
async fn test_install_failure_caches_nothing() {
    let network = full_network();
    network.go_offline();
    let storage = CacheStorage::new();
    let cache = OfflineCache::new(config(&[]).offline, storage.clone(), network);

    assert!(matches!(
        cache.install().await,
        Err(FetchError::Network { .. })
    ));
    assert!(storage.names().is_empty());
}

// =============================================================================
// Fetch Strategy
// =============================================================================

#[tokio::test]
async fn test_offline_navigation_serves_offline_page() {
    let network = full_network();
    let cache = OfflineCache::new(config(&[]).offline, CacheStorage::new(), network.clone());
    cache.install().await.unwrap();
    network.go_offline();

    let served = cache
        .fetch(&AssetRequest::navigation("/menu"))
        .await
        .unwrap();
    assert_eq!(served.source, AssetSource::OfflinePage);
    assert_eq!(served.asset.url, "http://localhost:8080/offline.html");
}

#[tokio::test]
async fn test_offline_image_serves_placeholder() {
    let network = full_network();
    let cache = OfflineCache::new(config(&[]).offline, CacheStorage::new(), network.clone());
    cache.install().await.unwrap();
    network.go_offline();

    let served = cache
        .fetch(&AssetRequest::image("https://images.example.com/new-dish.jpg"))
        .await
        .unwrap();
    assert_eq!(served.source, AssetSource::Placeholder);
}

#[tokio::test]
async fn test_runtime_cached_script_survives_going_offline() {
    let network = full_network();
    network.serve("http://localhost:8080/menu.js", "text/javascript");
    let cache = OfflineCache::new(config(&[]).offline, CacheStorage::new(), network.clone());

    let online = cache.fetch(&AssetRequest::get("/menu.js")).await.unwrap();
    assert_eq!(online.source, AssetSource::Network);
    network.go_offline();

    let offline = cache.fetch(&AssetRequest::get("/menu.js")).await.unwrap();
    assert_eq!(offline.source, AssetSource::Cache);
    assert_eq!(offline.asset.content_type.as_deref(), Some("text/javascript"));
}

#[tokio::test]
async fn test_uncached_script_offline_is_an_error() {
    let network = full_network();
    network.go_offline();
    let cache = OfflineCache::new(config(&[]).offline, CacheStorage::new(), network);

    assert!(cache.fetch(&AssetRequest::get("/app.js")).await.is_err());
}
