//! Offline cache commands.
//!
//! The cache lives in memory, so each command installs the app shell
//! before doing its work.

use chapati_ordering::offline::{
    AssetRequest, CacheStorage, HttpAssetFetcher, OfflineCache, OfflineSettings,
};
use chapati_ordering::{OrderingConfig, OrderingError};
use std::time::Duration;

use super::{CommandError, print};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

fn offline_cache() -> Result<OfflineCache<HttpAssetFetcher>, OrderingError> {
    let config = OrderingConfig::from_env()?;
    let settings: OfflineSettings = config.offline;
    let fetcher = HttpAssetFetcher::new(FETCH_TIMEOUT)?;
    Ok(OfflineCache::new(settings, CacheStorage::new(), fetcher))
}

/// Precache the app shell.
pub async fn install() -> Result<(), CommandError> {
    let cache = offline_cache()?;
    let count = cache.install().await.map_err(OrderingError::from)?;
    print(format!("Cached {count} assets"));
    Ok(())
}

/// Precache the app shell and delete caches from older versions.
pub async fn activate() -> Result<(), CommandError> {
    let cache = offline_cache()?;
    cache.install().await.map_err(OrderingError::from)?;
    let deleted = cache.activate();
    if deleted.is_empty() {
        print("No old caches to delete");
    }
    for name in deleted {
        print(format!("Deleted {name}"));
    }
    Ok(())
}

/// Fetch `url` through the cache.
///
/// A failed install is logged and the fetch goes ahead without fallbacks.
pub async fn fetch(url: &str, navigation: bool, image: bool) -> Result<(), CommandError> {
    let cache = offline_cache()?;
    if let Err(e) = cache.install().await {
        tracing::warn!(error = %e, "Install failed, fetching without offline fallbacks");
    }

    let request = if navigation {
        AssetRequest::navigation(url)
    } else if image {
        AssetRequest::image(url)
    } else {
        AssetRequest::get(url)
    };
    let served = cache.fetch(&request).await.map_err(OrderingError::from)?;
    print(format!(
        "{} {} ({:?}, {} bytes{})",
        served.asset.status,
        served.asset.url,
        served.source,
        served.asset.body.len(),
        served
            .asset
            .content_type
            .as_deref()
            .map(|content_type| format!(", {content_type}"))
            .unwrap_or_default()
    ));
    Ok(())
}
