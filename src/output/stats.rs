//! Statistics generation from the address database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::state::RunSummary;
use crate::storage::AddressStore;
use crate::Result;

/// Number of tags listed in the statistics printout
pub const TOP_TAG_LIMIT: usize = 10;

/// Database statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestStatistics {
    /// Rows in `addresses`
    pub addresses: usize,

    /// Rows in `unified_addresses`
    pub directory_entries: usize,

    /// Distinct tags
    pub tags: usize,

    /// Address/tag links
    pub links: usize,

    /// Addresses stored with icon bytes
    pub with_icons: usize,

    /// Most used tags and their address counts
    pub top_tags: Vec<(String, usize)>,
}

impl HarvestStatistics {
    /// Average number of tags per stored address
    pub fn avg_tags_per_address(&self) -> f64 {
        if self.addresses == 0 {
            0.0
        } else {
            self.links as f64 / self.addresses as f64
        }
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The storage backend to query
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(store: &dyn AddressStore) -> Result<HarvestStatistics> {
    Ok(HarvestStatistics {
        addresses: store.count_addresses()?,
        directory_entries: store.count_unified()?,
        tags: store.count_tags()?,
        links: store.count_links()?,
        with_icons: store.count_with_icons()?,
        top_tags: store.top_tags(TOP_TAG_LIMIT)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Addresses: {}", stats.addresses);
    println!("  Directory entries: {}", stats.directory_entries);
    println!("  Tags: {}", stats.tags);
    println!("  Address/tag links: {}", stats.links);
    println!(
        "  Average tags per address: {:.2}",
        stats.avg_tags_per_address()
    );

    let icon_share = if stats.addresses > 0 {
        (stats.with_icons as f64 / stats.addresses as f64) * 100.0
    } else {
        0.0
    };
    println!("  With icons: {} ({:.1}%)", stats.with_icons, icon_share);
    println!();

    if !stats.top_tags.is_empty() {
        println!("Top Tags:");
        for (tag, count) in &stats.top_tags {
            println!("  {}: {}", tag, count);
        }
        println!();
    }
}

/// Prints the totals of a finished run
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");
    println!(
        "  Tags completed: {} / {}",
        summary.tags_completed, summary.tags_pending
    );
    println!("  Pages read: {}", summary.pages);
    println!("  Addresses saved: {}", summary.addresses_persisted);
    println!("  Tag links saved: {}", summary.tags_saved);

    if summary.persistence_failures > 0 {
        println!("  Failed saves: {}", summary.persistence_failures);
    }

    if !summary.aborted_tags.is_empty() {
        println!("  Still pending ({}):", summary.aborted_tags.len());
        for tag in &summary.aborted_tags {
            println!("    - {}", tag);
        }
    }

    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
}
