//! Crawl-and-persist pipeline
//!
//! - [`discovery`] reads the tag cloud into the initial work list
//! - [`listing`] walks one tag's paginated listing as a stream of records
//! - [`icon`] resolves and downloads address icons
//! - [`orchestrator`] ties the above to the checkpoint and the store

pub mod discovery;
pub mod icon;
pub mod listing;
pub mod orchestrator;
pub mod record;

pub use discovery::discover_tags;
pub use icon::IconFetcher;
pub use listing::{ListingProgress, TagListing};
pub use orchestrator::Harvester;
pub use record::AddressRecord;

use crate::navigator::NavigatorError;
use thiserror::Error;

/// Failures that stop a tag listing (or discovery) from being walked further
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to load {url}: {source}")]
    Navigation {
        url: String,
        source: NavigatorError,
    },

    #[error("Page {page} of {url} did not render in time")]
    RenderTimeout { url: String, page: usize },

    #[error("Invalid listing URL: {0}")]
    Url(#[from] crate::url::UrlError),

    #[error(transparent)]
    Navigator(#[from] NavigatorError),
}
