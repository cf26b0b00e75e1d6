//! Paginated tag listing walker
//!
//! A [`TagListing`] walks the listing pages of one tag and hands out address
//! records one at a time, so each record can be persisted before the next
//! page is even requested. Addresses already seen earlier in the same walk
//! are dropped, including across page boundaries.
//!
//! Pages are told apart by the addresses they list, not by their URL: the
//! next-page control may swap the listing in place without navigating.

use crate::config::{NavigatorConfig, SelectorConfig};
use crate::harvest::record::{normalize_tags, AddressRecord};
use crate::harvest::ExtractError;
use crate::navigator::{ElementHandle, NavResult, PageNavigator};
use std::collections::{HashSet, VecDeque};
use tokio::time::{sleep, Instant};
use url::Url;

/// Counters for one listing walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingProgress {
    /// Listing pages loaded
    pub pages: usize,

    /// Address blocks enumerated across all pages
    pub blocks: usize,

    /// Records handed out
    pub yielded: usize,

    /// Blocks dropped because their address was already seen
    pub duplicates: usize,

    /// Blocks without an address
    pub empty: usize,

    /// Blocks that failed to read
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    Reading,
    Finished,
}

/// Pull-based record stream over one tag's listing pages
pub struct TagListing<'a, N: PageNavigator> {
    navigator: &'a mut N,
    selectors: &'a SelectorConfig,
    timing: &'a NavigatorConfig,
    url: Url,
    phase: Phase,
    blocks: VecDeque<ElementHandle>,
    seen: HashSet<String>,
    fingerprints: HashSet<Vec<String>>,
    progress: ListingProgress,
}

impl<'a, N: PageNavigator> TagListing<'a, N> {
    /// Prepares a walk starting at `url`; nothing is loaded until the first pull
    pub fn new(
        navigator: &'a mut N,
        url: Url,
        selectors: &'a SelectorConfig,
        timing: &'a NavigatorConfig,
    ) -> Self {
        Self {
            navigator,
            selectors,
            timing,
            url,
            phase: Phase::NotStarted,
            blocks: VecDeque::new(),
            seen: HashSet::new(),
            fingerprints: HashSet::new(),
            progress: ListingProgress::default(),
        }
    }

    pub fn progress(&self) -> &ListingProgress {
        &self.progress
    }

    /// Pulls the next unseen address record
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The next record, in page order
    /// * `Ok(None)` - The listing is exhausted (or had no content at all)
    /// * `Err(ExtractError)` - A page failed to load or render; the walk stops
    pub async fn next_record(&mut self) -> Result<Option<AddressRecord>, ExtractError> {
        if self.phase == Phase::Finished {
            return Ok(None);
        }

        let result = self.pull().await;
        if !matches!(result, Ok(Some(_))) {
            self.phase = Phase::Finished;
        }
        result
    }

    async fn pull(&mut self) -> Result<Option<AddressRecord>, ExtractError> {
        if self.phase == Phase::NotStarted {
            self.phase = Phase::Reading;
            if !self.open_first_page().await? {
                return Ok(None);
            }
        }

        loop {
            while let Some(block) = self.blocks.pop_front() {
                match self.read_block(&block).await {
                    Ok(Some(record)) => {
                        self.progress.yielded += 1;
                        return Ok(Some(record));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        self.progress.skipped += 1;
                        tracing::warn!(
                            "Skipping unreadable block on page {} of {}: {}",
                            self.progress.pages,
                            self.url,
                            e
                        );
                    }
                }
            }

            if !self.advance().await? {
                return Ok(None);
            }
        }
    }

    async fn open_first_page(&mut self) -> Result<bool, ExtractError> {
        let url = self.url.clone();
        self.navigator
            .navigate(&url)
            .await
            .map_err(|source| ExtractError::Navigation {
                url: url.to_string(),
                source,
            })?;

        let rendered = self
            .navigator
            .wait_for(&self.selectors.listing_block, self.timing.render_timeout())
            .await
            .map_err(|source| ExtractError::Navigation {
                url: url.to_string(),
                source,
            })?;

        if !rendered {
            tracing::info!("No listing rendered at {}", url);
            return Ok(false);
        }

        sleep(self.timing.settle_delay()).await;
        let blocks = self.query_blocks().await?;
        let fingerprint = self.fingerprint(&blocks).await;
        self.enter_page(blocks, fingerprint);

        if self.blocks.is_empty() {
            tracing::info!("Listing at {} has no address blocks", url);
            return Ok(false);
        }
        Ok(true)
    }

    /// Follows the next-page control; `false` once there is none
    async fn advance(&mut self) -> Result<bool, ExtractError> {
        let Some(next) = self.find_next_control().await? else {
            tracing::debug!(
                "No next page after page {} of {}",
                self.progress.pages,
                self.url
            );
            return Ok(false);
        };

        let from = self.current_url();
        self.navigator
            .click(&next)
            .await
            .map_err(|source| ExtractError::Navigation { url: from, source })?;

        let page = self.progress.pages + 1;
        let rendered = self
            .navigator
            .wait_for(&self.selectors.listing_block, self.timing.render_timeout())
            .await
            .map_err(|source| ExtractError::Navigation {
                url: self.current_url(),
                source,
            })?;

        if !rendered {
            return Err(ExtractError::RenderTimeout {
                url: self.current_url(),
                page,
            });
        }

        sleep(self.timing.page_delay()).await;

        // The control may swap the listing in place, so wait for content not shown yet
        let deadline = Instant::now() + self.timing.render_timeout();
        loop {
            let blocks = self.query_blocks().await?;
            let fingerprint = self.fingerprint(&blocks).await;
            if !self.fingerprints.contains(&fingerprint) {
                self.enter_page(blocks, fingerprint);
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    "Page {} of {} repeats an earlier page; treating the listing as finished",
                    page,
                    self.url
                );
                return Ok(false);
            }
            sleep(self.timing.poll_interval().min(deadline - now)).await;
        }
    }

    async fn query_blocks(&self) -> NavResult<Vec<ElementHandle>> {
        self.navigator.query_all(&self.selectors.listing_block).await
    }

    /// Addresses listed on the page, in order; unreadable blocks count as blank
    async fn fingerprint(&self, blocks: &[ElementHandle]) -> Vec<String> {
        let mut addresses = Vec::with_capacity(blocks.len());
        for block in blocks {
            let address = self
                .first_text(block, &self.selectors.address)
                .await
                .ok()
                .flatten()
                .unwrap_or_default();
            addresses.push(address);
        }
        addresses
    }

    fn enter_page(&mut self, blocks: Vec<ElementHandle>, fingerprint: Vec<String>) {
        self.fingerprints.insert(fingerprint);
        self.progress.pages += 1;
        self.progress.blocks += blocks.len();
        tracing::debug!(
            "Page {} of {}: {} address blocks",
            self.progress.pages,
            self.url,
            blocks.len()
        );

        self.blocks = blocks.into();
    }

    async fn find_next_control(&self) -> Result<Option<ElementHandle>, ExtractError> {
        let label = self.selectors.next_label.trim();
        for candidate in self.navigator.query_all(&self.selectors.next_page).await? {
            if self.navigator.text(&candidate).await? == label {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Reads one block; `Ok(None)` for blocks without a new address
    async fn read_block(&mut self, block: &ElementHandle) -> NavResult<Option<AddressRecord>> {
        let address = match self.first_text(block, &self.selectors.address).await? {
            Some(address) if !address.is_empty() => address,
            _ => {
                self.progress.empty += 1;
                return Ok(None);
            }
        };

        if self.seen.contains(&address) {
            self.progress.duplicates += 1;
            tracing::debug!("Dropping repeated address {} in {}", address, self.url);
            return Ok(None);
        }

        let display_name = self
            .first_text(block, &self.selectors.name)
            .await?
            .filter(|name| !name.is_empty());

        let mut raw_tags = Vec::new();
        for handle in self
            .navigator
            .query_within(block, &self.selectors.tag_name)
            .await?
        {
            raw_tags.push(self.navigator.text(&handle).await?);
        }

        let icon_url = match self
            .navigator
            .query_within(block, &self.selectors.icon)
            .await?
            .first()
        {
            Some(icon) => self
                .navigator
                .attribute(icon, "src")
                .await?
                .map(|src| src.trim().to_string())
                .filter(|src| !src.is_empty()),
            None => None,
        };

        self.seen.insert(address.clone());
        Ok(Some(AddressRecord {
            address,
            display_name,
            icon_url,
            icon_bytes: None,
            tags: normalize_tags(raw_tags),
        }))
    }

    async fn first_text(&self, scope: &ElementHandle, selector: &str) -> NavResult<Option<String>> {
        match self.navigator.query_within(scope, selector).await?.first() {
            Some(handle) => Ok(Some(self.navigator.text(handle).await?)),
            None => Ok(None),
        }
    }

    fn current_url(&self) -> String {
        self.navigator
            .current_url()
            .map(Url::to_string)
            .unwrap_or_else(|| self.url.to_string())
    }
}
