//! Icon download
//!
//! Icons are best-effort: any failure is logged and the record is stored
//! without icon bytes.

use crate::harvest::AddressRecord;
use crate::url::resolve_icon_url;
use reqwest::Client;
use tracing::{Instrument, Span};
use url::Url;

/// Fetches icon images relative to the explorer's base URL
#[derive(Debug, Clone)]
pub struct IconFetcher {
    client: Client,
    base_url: Url,
    span: Span,
}

impl IconFetcher {
    pub fn new(client: Client, base_url: Url, span: Span) -> Self {
        Self {
            client,
            base_url,
            span,
        }
    }

    /// Qualifies the record's icon source and downloads it
    ///
    /// On success `icon_url` holds the absolute URL and `icon_bytes` the body.
    /// A source that cannot be qualified is kept as scraped.
    pub async fn attach(&self, record: &mut AddressRecord) {
        let Some(src) = record.icon_url.as_deref() else {
            return;
        };

        let Some(url) = resolve_icon_url(src, &self.base_url) else {
            self.span.in_scope(|| {
                tracing::debug!("Icon source '{}' of {} is not fetchable", src, record.address);
            });
            return;
        };

        record.icon_url = Some(url.to_string());
        record.icon_bytes = self.fetch_url(&url).await;
    }

    /// Resolves `icon_src` against the base URL and downloads it
    pub async fn fetch(&self, icon_src: &str) -> Option<Vec<u8>> {
        let url = resolve_icon_url(icon_src, &self.base_url)?;
        self.fetch_url(&url).await
    }

    /// Downloads `url`
    ///
    /// # Returns
    ///
    /// * `Some(bytes)` - The response body of a successful, non-empty response
    /// * `None` - Transport failure, non-success status or empty body
    pub async fn fetch_url(&self, url: &Url) -> Option<Vec<u8>> {
        self.download(url).instrument(self.span.clone()).await
    }

    async fn download(&self, url: &Url) -> Option<Vec<u8>> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Icon request to {} failed: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Icon request to {} returned HTTP {}", url, status.as_u16());
            return None;
        }

        match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => {
                tracing::debug!("Icon at {} is empty", url);
                None
            }
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                tracing::warn!("Failed to read icon body from {}: {}", url, e);
                None
            }
        }
    }
}
