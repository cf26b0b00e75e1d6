//! Harvest orchestration
//!
//! This module contains the main loop that ties the pipeline together:
//! - Loading pending tags from the checkpoint, or discovering them
//! - Walking each tag's listing and persisting records as they arrive
//! - Removing a tag from the checkpoint once its listing is exhausted
//! - Closing the navigator on every exit path

use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::harvest::{discovery, IconFetcher, TagListing};
use crate::navigator::{build_http_client, HttpNavigator, PageNavigator};
use crate::state::{RunSummary, TagOutcome, TagProgress};
use crate::storage::{open_storage, AddressStore, SqliteStore};
use crate::url::tag_listing_url;
use crate::HarvestError;
use std::time::Instant;
use tracing::{Instrument, Span};
use url::Url;

/// Drives discovery, extraction and persistence over the pending tags
pub struct Harvester<N: PageNavigator, S: AddressStore> {
    config: Config,
    base_url: Url,
    navigator: N,
    store: S,
    checkpoint: CheckpointStore,
    icons: IconFetcher,
    fresh: bool,
    span: Span,
}

impl Harvester<HttpNavigator, SqliteStore> {
    /// Wires the HTTP navigator, SQLite store, checkpoint and icon fetcher from `config`
    ///
    /// The navigator and the icon fetcher share one HTTP client.
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The client, database or base URL could not be set up
    pub fn from_config(config: Config) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&config.source.base_url)?;

        if config.database.has_network_params() {
            tracing::warn!(
                "Database user/password/host/port are set but unused; addresses are stored in {}",
                config.database.name
            );
        }

        let client = build_http_client(&config.navigator)?;
        let navigator = HttpNavigator::new(
            client.clone(),
            &config.navigator,
            tracing::info_span!("navigator"),
        );
        let store = open_storage(&config)?;
        let checkpoint = CheckpointStore::new(
            config.checkpoint.path.clone(),
            tracing::info_span!("checkpoint"),
        );
        let icons = IconFetcher::new(client, base_url, tracing::info_span!("icons"));

        Self::new(
            config,
            navigator,
            store,
            checkpoint,
            icons,
            tracing::info_span!("harvest"),
        )
    }
}

impl<N: PageNavigator, S: AddressStore> Harvester<N, S> {
    /// Creates a harvester from already-built components
    pub fn new(
        config: Config,
        navigator: N,
        store: S,
        checkpoint: CheckpointStore,
        icons: IconFetcher,
        span: Span,
    ) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&config.source.base_url)?;
        Ok(Self {
            config,
            base_url,
            navigator,
            store,
            checkpoint,
            icons,
            fresh: false,
            span,
        })
    }

    /// Discards the pending tags at the start of the next run and rediscovers them
    pub fn fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn checkpoint(&self) -> &CheckpointStore {
        &self.checkpoint
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Processes every pending tag in checkpoint order
    ///
    /// The navigator is closed afterwards whether or not the run succeeded.
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Totals for the run
    /// * `Err(HarvestError)` - The checkpoint could not be read or written
    pub async fn run(&mut self) -> Result<RunSummary, HarvestError> {
        let started = Instant::now();
        let span = self.span.clone();

        let result = self.process_pending().instrument(span.clone()).await;
        let closed = self.navigator.close().await;

        let _entered = span.enter();
        if let Err(e) = &result {
            tracing::error!("Harvest stopped: {}", e);
        }
        if let Err(e) = closed {
            tracing::warn!("Failed to close navigator: {}", e);
        }

        let mut summary = result?;
        summary.elapsed = started.elapsed();
        tracing::info!(
            "Harvest finished: {}/{} tags completed, {} addresses saved in {:?}",
            summary.tags_completed,
            summary.tags_pending,
            summary.addresses_persisted,
            summary.elapsed
        );
        Ok(summary)
    }

    async fn process_pending(&mut self) -> Result<RunSummary, HarvestError> {
        if self.fresh {
            tracing::info!("Starting fresh harvest (discarding pending tags)");
            self.checkpoint.clear()?;
            self.fresh = false;
        }

        let tags = self.pending_tags().await?;
        let mut summary = RunSummary::new(tags.len());

        if tags.is_empty() {
            tracing::info!("No pending tags, nothing to do");
            return Ok(summary);
        }

        for (index, tag) in tags.iter().enumerate() {
            tracing::info!("[{}/{}] Harvesting tag '{}'", index + 1, tags.len(), tag);

            let progress = self.harvest_tag(tag).await;
            match &progress.outcome {
                TagOutcome::Exhausted => {
                    self.checkpoint.remove(tag)?;
                }
                TagOutcome::Aborted { reason } => {
                    tracing::warn!("Tag '{}' stays pending: {}", tag, reason);
                }
            }
            summary.record(&progress);
        }

        Ok(summary)
    }

    /// Pending tags from the checkpoint, discovering and saving them when none are left
    pub async fn pending_tags(&mut self) -> Result<Vec<String>, HarvestError> {
        let pending = self.checkpoint.load()?;
        if !pending.is_empty() {
            tracing::info!(
                "Resuming with {} pending tags from {}",
                pending.len(),
                self.checkpoint.path().display()
            );
            return Ok(pending);
        }

        let discovered = self.discover_tags().await;
        if discovered.is_empty() {
            return Ok(Vec::new());
        }

        self.checkpoint.save(&discovered)?;
        Ok(self.checkpoint.load()?)
    }

    /// Reads the tag cloud; any failure yields no tags
    pub async fn discover_tags(&mut self) -> Vec<String> {
        let discovered = discovery::discover_tags(
            &mut self.navigator,
            &self.base_url,
            &self.config.selectors,
            &self.config.navigator,
        )
        .instrument(self.span.clone())
        .await;

        match discovered {
            Ok(tags) => tags,
            Err(e) => {
                let _entered = self.span.enter();
                tracing::error!("Tag discovery failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Walks one tag's listing, persisting each record as it is extracted
    pub async fn harvest_tag(&mut self, tag: &str) -> TagProgress {
        let span = tracing::info_span!(parent: &self.span, "tag", tag = %tag);
        self.walk_tag(tag).instrument(span).await
    }

    async fn walk_tag(&mut self, tag: &str) -> TagProgress {
        let mut progress = TagProgress::new(tag);

        let url = match tag_listing_url(&self.base_url, tag) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Cannot build listing URL for '{}': {}", tag, e);
                progress.outcome = TagOutcome::Aborted {
                    reason: e.to_string(),
                };
                return progress;
            }
        };

        let mut listing = TagListing::new(
            &mut self.navigator,
            url,
            &self.config.selectors,
            &self.config.navigator,
        );

        loop {
            match listing.next_record().await {
                Ok(Some(mut record)) => {
                    progress.extracted += 1;
                    self.icons.attach(&mut record).await;

                    match self.store.save(&record) {
                        Ok(()) => {
                            progress.persisted += 1;
                            progress.tags_saved += record.tags.len();
                            if record.icon_bytes.is_some() {
                                progress.icons_fetched += 1;
                            }
                            tracing::debug!(
                                "Saved {} ({}) with {} tags",
                                record.address,
                                record.directory_name(),
                                record.tags.len()
                            );
                        }
                        Err(e) => {
                            progress.failed += 1;
                            tracing::error!("{}", e);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Listing for '{}' aborted: {}", tag, e);
                    progress.outcome = TagOutcome::Aborted {
                        reason: e.to_string(),
                    };
                    break;
                }
            }
        }

        progress.absorb_listing(listing.progress());
        tracing::info!(
            "Tag '{}' {}: {} pages, {} unique addresses, {} saved, {} tags saved ({:.2} per address)",
            tag,
            progress.outcome,
            progress.pages,
            progress.extracted,
            progress.persisted,
            progress.tags_saved,
            progress.avg_tags_per_address()
        );
        progress
    }
}
