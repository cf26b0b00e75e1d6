//! Output module for harvest reports
//!
//! This module handles:
//! - Printing database statistics and run summaries
//! - Exporting stored addresses as JSON

pub mod json;
pub mod stats;

pub use json::{build_export, export_json, ExportDocument, ExportedAddress};
pub use stats::{load_statistics, print_run_summary, print_statistics, HarvestStatistics};
