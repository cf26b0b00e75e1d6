use crate::harvest::ListingProgress;
use std::fmt;

/// How a tag's listing walk ended
///
/// Only an exhausted tag may leave the checkpoint; an aborted one is retried
/// on the next run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagOutcome {
    /// Every listing page was read
    Exhausted,

    /// A page failed to load or render
    Aborted { reason: String },
}

impl TagOutcome {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl fmt::Display for TagOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "exhausted"),
            Self::Aborted { reason } => write!(f, "aborted ({})", reason),
        }
    }
}

/// Counters for one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagProgress {
    pub tag: String,

    /// Listing pages loaded
    pub pages: usize,

    /// Unique records extracted
    pub extracted: usize,

    /// Records committed to the store
    pub persisted: usize,

    /// Records whose transaction failed
    pub failed: usize,

    /// Blocks that could not be read
    pub skipped_blocks: usize,

    /// Blocks dropped as repeats
    pub duplicates: usize,

    /// Tag links carried by persisted records
    pub tags_saved: usize,

    /// Records stored with icon bytes
    pub icons_fetched: usize,

    pub outcome: TagOutcome,
}

impl TagProgress {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            pages: 0,
            extracted: 0,
            persisted: 0,
            failed: 0,
            skipped_blocks: 0,
            duplicates: 0,
            tags_saved: 0,
            icons_fetched: 0,
            outcome: TagOutcome::Exhausted,
        }
    }

    /// Copies the listing walker's page-level counters
    pub fn absorb_listing(&mut self, listing: &ListingProgress) {
        self.pages = listing.pages;
        self.skipped_blocks = listing.skipped;
        self.duplicates = listing.duplicates;
    }

    /// Average tags per persisted address
    pub fn avg_tags_per_address(&self) -> f64 {
        if self.persisted == 0 {
            0.0
        } else {
            self.tags_saved as f64 / self.persisted as f64
        }
    }
}
