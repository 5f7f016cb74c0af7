//! Network access for URL image sources.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::{PaletteError, Result};

/// Downloads the raw bytes behind an image URL.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>>;
}

/// [`ImageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PaletteError::image_load("failed to build HTTP client", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::debug!(%url, "Fetching image");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PaletteError::image_load(format!("request to {url} failed"), e))?
            .error_for_status()
            .map_err(|e| PaletteError::image_load(format!("{url} returned an error status"), e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PaletteError::image_load(format!("reading body of {url} failed"), e))?;
        Ok(bytes.to_vec())
    }
}
