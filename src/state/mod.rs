//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `TagOutcome`: How a tag's listing walk ended (exhausted or aborted)
//! - `TagProgress`: Per-tag counters reported after each tag
//! - `RunSummary`: Totals over one run of the harvester

mod run_summary;
mod tag_progress;

// Re-export main types
pub use run_summary::RunSummary;
pub use tag_progress::{TagOutcome, TagProgress};
