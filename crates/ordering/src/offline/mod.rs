//! Offline asset cache.
//!
//! Keeps the page usable without a connection:
//!
//! - [`OfflineCache::install`] precaches the app shell into a versioned cache.
//! - [`OfflineCache::activate`] deletes caches left by older versions.
//! - [`OfflineCache::fetch`] serves cache-first, fills the cache from the
//!   network, and falls back to the offline page or a placeholder image
//!   when the network fails.

mod fetcher;
mod storage;

pub use fetcher::{AssetFetcher, HttpAssetFetcher};
pub use storage::CacheStorage;

use std::sync::Arc;

use reqwest::Method;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Asset fetch failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid asset url {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("request for {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("cache storage is unavailable")]
    CacheUnavailable,
}

/// What kind of resource a request is for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Destination {
    Document,
    Image,
    Script,
    Style,
    Font,
    #[default]
    Other,
}

/// An outgoing asset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub url: String,
    pub method: Method,
    pub accept: Option<String>,
    pub destination: Destination,
}

impl AssetRequest {
    /// A plain GET.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            accept: None,
            destination: Destination::Other,
        }
    }

    /// A page navigation (accepts HTML).
    #[must_use]
    pub fn navigation(url: impl Into<String>) -> Self {
        Self {
            accept: Some("text/html,application/xhtml+xml".to_string()),
            destination: Destination::Document,
            ..Self::get(url)
        }
    }

    /// An image load.
    #[must_use]
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            accept: Some("image/*".to_string()),
            destination: Destination::Image,
            ..Self::get(url)
        }
    }

    /// Override the method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    fn wants_html(&self) -> bool {
        self.accept
            .as_deref()
            .is_some_and(|accept| accept.contains("text/html"))
    }
}

/// A cached or fetched response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Arc<[u8]>,
}

impl Asset {
    /// Whether the status is 200.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Where a served asset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSource {
    /// Served from the current cache.
    Cache,
    /// Fetched from the network.
    Network,
    /// Network failed; the cached offline page was served.
    OfflinePage,
    /// Network failed; the cached placeholder image was served.
    Placeholder,
    /// Not eligible for caching; passed straight to the network.
    Bypass,
}

/// An asset and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub asset: Asset,
    pub source: AssetSource,
}

/// Settings for an [`OfflineCache`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineSettings {
    /// Versioned cache name, e.g. `pfg-chapati-v1.3`.
    pub cache_name: String,
    /// Origin the page is served from; relative paths resolve against it.
    pub site_url: Url,
    /// Path or URL of the offline fallback page.
    pub offline_page: String,
    /// Path or URL served when an image cannot be loaded.
    pub placeholder_image: String,
    /// Assets cached at install time.
    pub precache: Vec<String>,
}

/// Cache-first asset loader with offline fallbacks.
#[derive(Debug, Clone)]
pub struct OfflineCache<F> {
    settings: OfflineSettings,
    storage: CacheStorage,
    fetcher: F,
}

impl<F: AssetFetcher + Sync> OfflineCache<F> {
    pub const fn new(settings: OfflineSettings, storage: CacheStorage, fetcher: F) -> Self {
        Self {
            settings,
            storage,
            fetcher,
        }
    }

    /// The underlying cache storage.
    #[must_use]
    pub const fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Resolve a site-relative path or absolute URL to an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if `path` cannot be resolved.
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.settings
            .site_url
            .join(path)
            .map_err(|source| FetchError::InvalidUrl {
                url: path.to_string(),
                source,
            })
    }

    /// Precache every manifest asset into the current cache.
    ///
    /// All assets are fetched before anything is stored; if any fails the
    /// cache is left untouched. Returns the number of assets cached.
    ///
    /// # Errors
    ///
    /// Returns the first `FetchError` encountered.
    #[instrument(skip(self), fields(cache = %self.settings.cache_name))]
    pub async fn install(&self) -> Result<usize, FetchError> {
        info!(assets = self.settings.precache.len(), "Installing offline cache");

        let mut fetched = Vec::with_capacity(self.settings.precache.len());
        for path in &self.settings.precache {
            let url = self.resolve(path)?;
            let asset = self
                .fetcher
                .fetch(&AssetRequest::get(url.as_str()))
                .await
                .inspect_err(|e| warn!(error = %e, "Precache fetch failed"))?;
            if !asset.is_ok() {
                warn!(url = %url, status = asset.status, "Precache returned non-OK status");
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: asset.status,
                });
            }
            fetched.push((url.to_string(), asset));
        }

        let cache = self
            .storage
            .open(&self.settings.cache_name)
            .ok_or(FetchError::CacheUnavailable)?;
        let count = fetched.len();
        for (key, asset) in fetched {
            cache.insert(key, asset).await;
        }

        info!(count, "Offline cache installed");
        Ok(count)
    }

    /// Delete every cache not named like the current one.
    ///
    /// Returns the names deleted.
    #[instrument(skip(self), fields(cache = %self.settings.cache_name))]
    pub fn activate(&self) -> Vec<String> {
        let stale: Vec<String> = self
            .storage
            .names()
            .into_iter()
            .filter(|name| name != &self.settings.cache_name)
            .collect();
        for name in &stale {
            info!(stale = %name, "Deleting old cache");
            self.storage.delete(name);
        }
        stale
    }

    /// Serve a request cache-first with offline fallbacks.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the network fails and no fallback is
    /// cached, or when the URL is invalid.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn fetch(&self, request: &AssetRequest) -> Result<Served, FetchError> {
        if request.method != Method::GET || request.url.starts_with("chrome-extension://") {
            debug!("Bypassing cache");
            let asset = self.fetcher.fetch(request).await?;
            return Ok(Served {
                asset,
                source: AssetSource::Bypass,
            });
        }

        let url = self.resolve(&request.url)?;
        let key = url.to_string();

        if let Some(asset) = self.cached(&key).await {
            debug!("Serving from cache");
            return Ok(Served {
                asset,
                source: AssetSource::Cache,
            });
        }

        let mut network_request = request.clone();
        network_request.url.clone_from(&key);

        match self.fetcher.fetch(&network_request).await {
            Ok(asset) => {
                if asset.is_ok()
                    && url.origin() == self.settings.site_url.origin()
                    && let Some(cache) = self.storage.open(&self.settings.cache_name)
                {
                    debug!("Caching new resource");
                    cache.insert(key, asset.clone()).await;
                }
                Ok(Served {
                    asset,
                    source: AssetSource::Network,
                })
            }
            Err(e) => {
                warn!(error = %e, "Network failed, trying offline fallbacks");
                self.fallback(request, &key).await.ok_or(e)
            }
        }
    }

    async fn fallback(&self, request: &AssetRequest, key: &str) -> Option<Served> {
        if request.wants_html() {
            let offline = self.resolve(&self.settings.offline_page).ok()?;
            return self.cached(offline.as_str()).await.map(|asset| Served {
                asset,
                source: AssetSource::OfflinePage,
            });
        }

        if request.destination == Destination::Image {
            let placeholder = self.resolve(&self.settings.placeholder_image).ok()?;
            return self.cached(placeholder.as_str()).await.map(|asset| Served {
                asset,
                source: AssetSource::Placeholder,
            });
        }

        self.cached(key).await.map(|asset| Served {
            asset,
            source: AssetSource::Cache,
        })
    }

    async fn cached(&self, key: &str) -> Option<Asset> {
        let cache = self.storage.get(&self.settings.cache_name)?;
        cache.get(key).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fetcher serving canned responses; unknown URLs fail like a dropped
    /// connection.
    #[derive(Default)]
    struct FakeFetcher {
        responses: Mutex<HashMap<String, u16>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(self, url: &str, status: u16) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), status);
            self
        }

        fn go_offline(&self) {
            self.responses.lock().unwrap().clear();
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl AssetFetcher for FakeFetcher {
        async fn fetch(&self, request: &AssetRequest) -> Result<Asset, FetchError> {
            self.calls.lock().unwrap().push(request.url.clone());
            let status = self.responses.lock().unwrap().get(&request.url).copied();
            status
                .map(|status| Asset {
                    url: request.url.clone(),
                    status,
                    content_type: None,
                    body: Arc::from(request.url.as_bytes()),
                })
                .ok_or_else(|| FetchError::Network {
                    url: request.url.clone(),
                    message: "offline".to_string(),
                })
        }
    }

    fn settings() -> OfflineSettings {
        OfflineSettings {
            cache_name: "pfg-chapati-v1.3".to_string(),
            site_url: Url::parse("http://localhost:8080/").unwrap(),
            offline_page: "/offline.html".to_string(),
            placeholder_image: "https://images.example.com/chapati.jpg".to_string(),
            precache: vec![
                "/".to_string(),
                "/offline.html".to_string(),
                "https://images.example.com/chapati.jpg".to_string(),
            ],
        }
    }

    fn online() -> FakeFetcher {
        FakeFetcher::default()
            .with("http://localhost:8080/", 200)
            .with("http://localhost:8080/offline.html", 200)
            .with("https://images.example.com/chapati.jpg", 200)
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let cache = OfflineCache::new(settings(), CacheStorage::new(), online());
        assert_eq!(cache.install().await.unwrap(), 3);

        let served = cache
            .fetch(&AssetRequest::navigation("http://localhost:8080/"))
            .await
            .unwrap();
        assert_eq!(served.source, AssetSource::Cache);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let fetcher = FakeFetcher::default().with("http://localhost:8080/", 200);
        let storage = CacheStorage::new();
        let cache = OfflineCache::new(settings(), storage.clone(), fetcher);

        assert!(cache.install().await.is_err());
        assert!(storage.get("pfg-chapati-v1.3").is_none());
    }

    #[tokio::test]
    async fn test_activate_deletes_old_caches() {
        let storage = CacheStorage::new();
        let _ = storage.open("pfg-chapati-v1.2");
        let _ = storage.open("pfg-chapati-v1.3");
        let cache = OfflineCache::new(settings(), storage.clone(), online());

        assert_eq!(cache.activate(), vec!["pfg-chapati-v1.2".to_string()]);
        assert_eq!(storage.names(), vec!["pfg-chapati-v1.3".to_string()]);
    }

    #[tokio::test]
    async fn test_network_response_cached_only_when_same_origin() {
        let fetcher = online()
            .with("http://localhost:8080/style.css", 200)
            .with("https://cdn.example.com/all.min.css", 200);
        let cache = OfflineCache::new(settings(), CacheStorage::new(), fetcher);

        let first = cache.fetch(&AssetRequest::get("/style.css")).await.unwrap();
        assert_eq!(first.source, AssetSource::Network);
        let second = cache.fetch(&AssetRequest::get("/style.css")).await.unwrap();
        assert_eq!(second.source, AssetSource::Cache);

        let cdn = AssetRequest::get("https://cdn.example.com/all.min.css");
        cache.fetch(&cdn).await.unwrap();
        assert_eq!(
            cache.fetch(&cdn).await.unwrap().source,
            AssetSource::Network
        );
    }

    #[tokio::test]
    async fn test_non_ok_response_not_cached() {
        let fetcher = online().with("http://localhost:8080/missing.js", 404);
        let cache = OfflineCache::new(settings(), CacheStorage::new(), fetcher);

        let request = AssetRequest::get("/missing.js");
        assert_eq!(cache.fetch(&request).await.unwrap().asset.status, 404);
        assert_eq!(
            cache.fetch(&request).await.unwrap().source,
            AssetSource::Network
        );
    }

    #[tokio::test]
    async fn test_offline_fallbacks() {
        let cache = OfflineCache::new(settings(), CacheStorage::new(), online());
        cache.install().await.unwrap();
        cache.fetcher.go_offline();

        let page = cache
            .fetch(&AssetRequest::navigation("/menu.html"))
            .await
            .unwrap();
        assert_eq!(page.source, AssetSource::OfflinePage);
        assert_eq!(page.asset.url, "http://localhost:8080/offline.html");

        let image = cache
            .fetch(&AssetRequest::image("https://images.example.com/rolex.jpg"))
            .await
            .unwrap();
        assert_eq!(image.source, AssetSource::Placeholder);

        let script = cache.fetch(&AssetRequest::get("/script.js")).await;
        assert!(matches!(script, Err(FetchError::Network { .. })));
    }

    #[tokio::test]
    async fn test_non_get_bypasses_cache() {
        let fetcher = online();
        let cache = OfflineCache::new(settings(), CacheStorage::new(), fetcher);
        cache.install().await.unwrap();
        let before = cache.fetcher.calls();

        let request = AssetRequest::get("http://localhost:8080/").with_method(Method::POST);
        let served = cache.fetch(&request).await.unwrap();
        assert_eq!(served.source, AssetSource::Bypass);
        assert_eq!(cache.fetcher.calls(), before + 1);

        let extension = AssetRequest::get("chrome-extension://abc/script.js");
        assert!(cache.fetch(&extension).await.is_err());
    }
}
