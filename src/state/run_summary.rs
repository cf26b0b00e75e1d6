use crate::state::TagProgress;
use std::time::Duration;

/// Totals over one harvester run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Tags pending when the run started
    pub tags_pending: usize,

    /// Tags walked to the end and removed from the checkpoint
    pub tags_completed: usize,

    /// Tags left pending after a page failure
    pub aborted_tags: Vec<String>,

    pub pages: usize,
    pub addresses_persisted: usize,
    pub persistence_failures: usize,
    pub tags_saved: usize,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(tags_pending: usize) -> Self {
        Self {
            tags_pending,
            ..Self::default()
        }
    }

    /// Folds one finished tag into the totals
    pub fn record(&mut self, progress: &TagProgress) {
        if progress.outcome.is_exhausted() {
            self.tags_completed += 1;
        } else {
            self.aborted_tags.push(progress.tag.clone());
        }

        self.pages += progress.pages;
        self.addresses_persisted += progress.persisted;
        self.persistence_failures += progress.failed;
        self.tags_saved += progress.tags_saved;
    }

    /// Tags still pending for the next run
    pub fn tags_remaining(&self) -> usize {
        self.tags_pending.saturating_sub(self.tags_completed)
    }

    /// True when every pending tag completed and every record was stored
    pub fn is_clean(&self) -> bool {
        self.aborted_tags.is_empty()
            && self.persistence_failures == 0
            && self.tags_completed == self.tags_pending
    }
}
