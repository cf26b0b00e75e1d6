//! Parsed page shared by the HTML-backed navigators

use crate::navigator::{parse_selector, ElementHandle, NavResult, NavigatorError};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A loaded document plus the generation that stamps its handles
pub(crate) struct HtmlPage {
    url: Url,
    document: Html,
    generation: u64,
}

impl HtmlPage {
    pub(crate) fn parse(url: Url, body: &str, generation: u64) -> Self {
        Self {
            url,
            document: Html::parse_document(body),
            generation,
        }
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    /// Elements in document (pre-)order; an element's position here is its ordinal
    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document.tree.root().descendants().filter_map(ElementRef::wrap)
    }

    fn element(&self, handle: &ElementHandle) -> NavResult<ElementRef<'_>> {
        if handle.page() != self.generation {
            return Err(NavigatorError::StaleHandle);
        }
        self.elements()
            .nth(handle.ordinal())
            .ok_or(NavigatorError::StaleHandle)
    }

    pub(crate) fn matches(&self, selector: &Selector) -> bool {
        self.document.select(selector).next().is_some()
    }

    pub(crate) fn query_all(&self, selector: &str) -> NavResult<Vec<ElementHandle>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .elements()
            .enumerate()
            .filter(|(_, element)| selector.matches(element))
            .map(|(ordinal, _)| ElementHandle::new(self.generation, ordinal))
            .collect())
    }

    pub(crate) fn query_within(
        &self,
        scope: &ElementHandle,
        selector: &str,
    ) -> NavResult<Vec<ElementHandle>> {
        let selector = parse_selector(selector)?;
        let root = self.element(scope)?;
        let base = scope.ordinal();

        // A subtree's elements are contiguous in pre-order, so offsets map onto ordinals
        Ok(root
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
            .skip(1)
            .filter(|(_, element)| selector.matches(element))
            .map(|(offset, _)| ElementHandle::new(self.generation, base + offset))
            .collect())
    }

    pub(crate) fn attribute(&self, handle: &ElementHandle, name: &str) -> NavResult<Option<String>> {
        let element = self.element(handle)?;
        Ok(element.value().attr(name).map(str::to_string))
    }

    pub(crate) fn text(&self, handle: &ElementHandle) -> NavResult<String> {
        let element = self.element(handle)?;
        let raw: String = element.text().collect();
        Ok(raw.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Absolute target of a link element
    pub(crate) fn link_target(&self, handle: &ElementHandle) -> NavResult<Url> {
        let href = self
            .attribute(handle, "href")?
            .map(|href| href.trim().to_string())
            .unwrap_or_default();

        if href.is_empty() {
            return Err(NavigatorError::NotNavigable {
                reason: "element has no href".to_string(),
            });
        }

        if href.starts_with('#') || href.to_ascii_lowercase().starts_with("javascript:") {
            return Err(NavigatorError::NotNavigable {
                reason: format!("href '{}' does not load a page", href),
            });
        }

        self.url.join(&href).map_err(|source| NavigatorError::InvalidUrl {
            url: href,
            source,
        })
    }
}
