//! HTTP + HTML-parsing navigator
//!
//! Loads pages with a `reqwest` client and answers queries against the parsed
//! document. Rendering is not simulated: waiting for a selector re-fetches the
//! current URL until the selector matches or the timeout elapses, and clicking
//! follows the element's `href`.

use crate::config::NavigatorConfig;
use crate::navigator::{
    parse_selector, ElementHandle, HtmlPage, NavResult, NavigatorError, PageNavigator,
};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{Instrument, Span};
use url::Url;

/// Builds the HTTP client shared by the navigator and the icon fetcher
///
/// # Example
///
/// ```no_run
/// use tag_harvester::config::NavigatorConfig;
/// use tag_harvester::navigator::build_http_client;
///
/// let client = build_http_client(&NavigatorConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &NavigatorConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Navigator backed by plain HTTP requests
pub struct HttpNavigator {
    client: Client,
    page: Option<HtmlPage>,
    generation: u64,
    poll_interval: Duration,
    span: Span,
}

impl HttpNavigator {
    /// Creates a navigator over `client`
    ///
    /// This backend never opens a window, so `headless = false` only earns a
    /// warning.
    pub fn new(client: Client, config: &NavigatorConfig, span: Span) -> Self {
        if !config.headless {
            span.in_scope(|| {
                tracing::warn!("headless = false has no effect on the HTTP navigator");
            });
        }

        Self {
            client,
            page: None,
            generation: 0,
            poll_interval: config.poll_interval(),
            span,
        }
    }

    fn page(&self) -> NavResult<&HtmlPage> {
        self.page.as_ref().ok_or(NavigatorError::NoPage)
    }

    async fn load(&mut self, url: Url) -> NavResult<()> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .instrument(self.span.clone())
            .await
            .map_err(|source| NavigatorError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigatorError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|source| NavigatorError::Http {
            url: url.to_string(),
            source,
        })?;

        self.generation += 1;
        self.page = Some(HtmlPage::parse(final_url, &body, self.generation));
        Ok(())
    }
}

#[async_trait(?Send)]
impl PageNavigator for HttpNavigator {
    async fn navigate(&mut self, url: &Url) -> NavResult<()> {
        self.span.in_scope(|| tracing::debug!("GET {}", url));
        self.load(url.clone()).await
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> NavResult<bool> {
        let selector = parse_selector(selector)?;
        let deadline = Instant::now() + timeout;

        loop {
            if self.page()?.matches(&selector) {
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }

            sleep(self.poll_interval.min(deadline - now)).await;

            let url = self.page()?.url().clone();
            self.span.in_scope(|| tracing::trace!("Re-fetching {} while waiting", url));
            self.load(url).await?;
        }
    }

    async fn query_all(&self, selector: &str) -> NavResult<Vec<ElementHandle>> {
        self.page()?.query_all(selector)
    }

    async fn query_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> NavResult<Vec<ElementHandle>> {
        self.page()?.query_within(scope, selector)
    }

    async fn attribute(&self, handle: &ElementHandle, name: &str) -> NavResult<Option<String>> {
        self.page()?.attribute(handle, name)
    }

    async fn text(&self, handle: &ElementHandle) -> NavResult<String> {
        self.page()?.text(handle)
    }

    async fn click(&mut self, handle: &ElementHandle) -> NavResult<()> {
        let target = self.page()?.link_target(handle)?;
        self.span.in_scope(|| tracing::debug!("Following link to {}", target));
        self.load(target).await
    }

    fn current_url(&self) -> Option<&Url> {
        self.page.as_ref().map(HtmlPage::url)
    }

    async fn close(&mut self) -> NavResult<()> {
        self.page = None;
        self.span.in_scope(|| tracing::debug!("Navigator closed"));
        Ok(())
    }
}
