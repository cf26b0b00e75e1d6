//! JSON export of the address database

use crate::storage::AddressStore;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Top-level export document
#[derive(Debug, Serialize)]
pub struct ExportDocument {
    pub exported_at: DateTime<Utc>,
    pub count: usize,
    pub addresses: Vec<ExportedAddress>,
}

/// One address as written to the export
#[derive(Debug, Serialize)]
pub struct ExportedAddress {
    pub address: String,
    pub name: Option<String>,
    pub directory_name: String,
    pub source: Option<String>,
    pub icon_url: Option<String>,
    pub icon_size: Option<usize>,
    pub tags: Vec<String>,
}

/// Collects every stored address with its directory entry and tags
pub fn build_export(store: &dyn AddressStore) -> Result<ExportDocument> {
    let mut addresses = Vec::new();

    for row in store.list_addresses()? {
        let unified = store.get_unified(&row.address)?;
        let tags = store.tags_for_address(&row.address)?;

        addresses.push(ExportedAddress {
            directory_name: unified
                .as_ref()
                .map(|entry| entry.address_name.clone())
                .unwrap_or_default(),
            source: unified.map(|entry| entry.source),
            icon_size: row.icon.as_ref().map(Vec::len),
            address: row.address,
            name: row.name,
            icon_url: row.icon_url,
            tags,
        });
    }

    Ok(ExportDocument {
        exported_at: Utc::now(),
        count: addresses.len(),
        addresses,
    })
}

/// Writes the export as pretty-printed JSON to `path`
///
/// # Returns
///
/// * `Ok(usize)` - Number of addresses written
/// * `Err(HarvestError)` - Query, serialization or write failure
pub fn export_json(store: &dyn AddressStore, path: &Path) -> Result<usize> {
    let document = build_export(store)?;
    let json = serde_json::to_string_pretty(&document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    tracing::info!("Exported {} addresses to {}", document.count, path.display());
    Ok(document.count)
}
