//! Page navigation capability
//!
//! The harvester never touches a DOM directly. It drives a [`PageNavigator`],
//! which loads pages and answers selector queries with opaque
//! [`ElementHandle`]s. The shipped backend, [`HttpNavigator`], fetches pages
//! with `reqwest` and parses them with `scraper`; a browser-automation backend
//! would implement the same trait.
//!
//! Handles are only valid for the page they were produced on. Once the
//! navigator loads another page (including a reload while waiting for
//! content), older handles fail with [`NavigatorError::StaleHandle`].

#[cfg(test)]
pub(crate) mod fixture;
mod http;
mod page;

pub use http::{build_http_client, HttpNavigator};
pub(crate) use page::HtmlPage;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised by a page navigator
#[derive(Debug, Error)]
pub enum NavigatorError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Element handle belongs to a page that is no longer loaded")]
    StaleHandle,

    #[error("No page is loaded")]
    NoPage,

    #[error("Element cannot be followed: {reason}")]
    NotNavigable { reason: String },
}

/// Result type for navigator operations
pub type NavResult<T> = Result<T, NavigatorError>;

/// Opaque reference to one element of the currently loaded page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    page: u64,
    ordinal: usize,
}

impl ElementHandle {
    pub(crate) fn new(page: u64, ordinal: usize) -> Self {
        Self { page, ordinal }
    }

    pub(crate) fn page(&self) -> u64 {
        self.page
    }

    pub(crate) fn ordinal(&self) -> usize {
        self.ordinal
    }
}

/// Browser-like page access used by tag discovery and listing extraction
///
/// Implementations are driven from a single task, so futures need not be
/// `Send`.
#[async_trait(?Send)]
pub trait PageNavigator {
    /// Loads `url`, replacing the current page
    async fn navigate(&mut self, url: &Url) -> NavResult<()>;

    /// Waits until `selector` matches on the current page
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The selector matched before `timeout` elapsed
    /// * `Ok(false)` - Nothing matched in time
    /// * `Err(NavigatorError)` - The page could not be (re)loaded
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> NavResult<bool>;

    /// All elements matching `selector`, in document order
    async fn query_all(&self, selector: &str) -> NavResult<Vec<ElementHandle>>;

    /// Descendants of `scope` matching `selector`, in document order
    async fn query_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> NavResult<Vec<ElementHandle>>;

    /// Value of attribute `name`, if present
    async fn attribute(&self, handle: &ElementHandle, name: &str) -> NavResult<Option<String>>;

    /// Rendered text of the element with whitespace collapsed
    async fn text(&self, handle: &ElementHandle) -> NavResult<String>;

    /// Activates the element (follows a link), loading the resulting page
    async fn click(&mut self, handle: &ElementHandle) -> NavResult<()>;

    /// URL of the current page
    fn current_url(&self) -> Option<&Url>;

    /// Releases the navigator's session
    async fn close(&mut self) -> NavResult<()>;
}

/// Parses a CSS selector into the navigator error space
pub(crate) fn parse_selector(selector: &str) -> NavResult<scraper::Selector> {
    scraper::Selector::parse(selector).map_err(|e| NavigatorError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
