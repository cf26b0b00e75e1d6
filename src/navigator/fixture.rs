//! In-memory navigator over canned pages, for unit tests

use crate::navigator::{ElementHandle, HtmlPage, NavResult, NavigatorError, PageNavigator};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use url::Url;

/// Serves fixed HTML per URL; unknown URLs answer 404
///
/// Pages queued with [`FixtureNavigator::with_in_place_pages`] replace the
/// current document on each click without changing the URL, the way a
/// script-driven pager does.
#[derive(Default)]
pub(crate) struct FixtureNavigator {
    pages: HashMap<String, String>,
    in_place: VecDeque<String>,
    failing_text: Option<String>,
    page: Option<HtmlPage>,
    generation: u64,
    pub(crate) visited: Vec<String>,
    pub(crate) closed: bool,
}

impl FixtureNavigator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub(crate) fn with_in_place_pages(mut self, pages: &[String]) -> Self {
        self.in_place.extend(pages.iter().cloned());
        self
    }

    /// Reading an element whose text equals `text` fails
    pub(crate) fn with_failing_text(mut self, text: &str) -> Self {
        self.failing_text = Some(text.to_string());
        self
    }

    fn page(&self) -> NavResult<&HtmlPage> {
        self.page.as_ref().ok_or(NavigatorError::NoPage)
    }

    fn load(&mut self, url: &Url) -> NavResult<()> {
        self.visited.push(url.to_string());
        let html = self
            .pages
            .get(url.as_str())
            .ok_or_else(|| NavigatorError::Status {
                url: url.to_string(),
                status: 404,
            })?;
        self.generation += 1;
        self.page = Some(HtmlPage::parse(url.clone(), html, self.generation));
        Ok(())
    }
}

#[async_trait(?Send)]
impl PageNavigator for FixtureNavigator {
    async fn navigate(&mut self, url: &Url) -> NavResult<()> {
        self.load(url)
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> NavResult<bool> {
        let selector = crate::navigator::parse_selector(selector)?;
        Ok(self.page()?.matches(&selector))
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
        let text = self.page()?.text(handle)?;
        if self.failing_text.as_deref() == Some(text.as_str()) {
            return Err(NavigatorError::StaleHandle);
        }
        Ok(text)
    }

    async fn click(&mut self, handle: &ElementHandle) -> NavResult<()> {
        if let Some(html) = self.in_place.pop_front() {
            let url = self.page()?.url().clone();
            self.generation += 1;
            self.page = Some(HtmlPage::parse(url, &html, self.generation));
            return Ok(());
        }

        let target = self.page()?.link_target(handle)?;
        self.load(&target)
    }

    fn current_url(&self) -> Option<&Url> {
        self.page.as_ref().map(HtmlPage::url)
    }

    async fn close(&mut self) -> NavResult<()> {
        self.closed = true;
        self.page = None;
        Ok(())
    }
}
