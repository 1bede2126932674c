//! Network side of the offline cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use super::{Asset, AssetRequest, FetchError};

/// Fetches assets from the network.
pub trait AssetFetcher {
    /// Perform the request. Non-2xx responses are returned, not errors.
    fn fetch(
        &self,
        request: &AssetRequest,
    ) -> impl Future<Output = Result<Asset, FetchError>> + Send;
}

/// [`AssetFetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    /// Create a fetcher with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl AssetFetcher for HttpAssetFetcher {
    #[instrument(skip(self, request), fields(url = %request.url, method = %request.method))]
    async fn fetch(&self, request: &AssetRequest) -> Result<Asset, FetchError> {
        let network_error = |e: reqwest::Error| FetchError::Network {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let mut builder = self.client.request(request.method.clone(), &request.url);
        if let Some(accept) = &request.accept {
            builder = builder.header("Accept", accept);
        }
        let response = builder.send().await.map_err(network_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let body = response.bytes().await.map_err(network_error)?;
        debug!(status, bytes = body.len(), "Fetched asset");

        Ok(Asset {
            url: request.url.clone(),
            status,
            content_type,
            body: Arc::from(body.as_ref()),
        })
    }
}
