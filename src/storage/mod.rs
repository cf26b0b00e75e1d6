//! Storage module for persisting harvested addresses
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Atomic per-record upserts across the address tables
//! - Read access for statistics and export

mod schema;
mod sqlite;
mod traits;

pub use schema::initialize_schema;
pub use sqlite::SqliteStore;
pub use traits::{AddressStore, StorageError, StorageResult};

use crate::config::Config;
use crate::Result;
use std::path::Path;

/// Opens (or creates) the address database named by `config`
///
/// Rows written through the store carry the configured provenance.
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized storage
/// * `Err(HarvestError)` - Failed to initialize storage
pub fn open_storage(config: &Config) -> Result<SqliteStore> {
    SqliteStore::open(Path::new(&config.database.name), &config.source.provenance)
}

/// A row of the `addresses` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAddress {
    pub id: i64,
    pub address: String,
    pub name: Option<String>,
    pub icon: Option<Vec<u8>>,
    pub icon_url: Option<String>,
}

/// A row of the `unified_addresses` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedAddress {
    pub address: String,
    pub address_name: String,
    pub kind: String,
    pub source: String,
}
