//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::harvest::AddressRecord;
use crate::storage::{StoredAddress, UnifiedAddress};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to persist address {address}: {source}")]
    Persistence {
        address: String,
        source: rusqlite::Error,
    },

    #[error("Refusing to store a record without an address")]
    EmptyAddress,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Writes go through [`AddressStore::save`], which applies one record
/// atomically. The read side serves reporting and export.
pub trait AddressStore {
    /// Upserts one record across all address tables in a single transaction
    ///
    /// On error nothing of the record is written.
    fn save(&mut self, record: &AddressRecord) -> StorageResult<()>;

    /// Gets an address row by its address
    fn get_address(&self, address: &str) -> StorageResult<Option<StoredAddress>>;

    /// Gets the directory entry for an address
    fn get_unified(&self, address: &str) -> StorageResult<Option<UnifiedAddress>>;

    /// Tags linked to an address, alphabetically
    fn tags_for_address(&self, address: &str) -> StorageResult<Vec<String>>;

    /// All stored addresses in insertion order
    fn list_addresses(&self) -> StorageResult<Vec<StoredAddress>>;

    fn count_addresses(&self) -> StorageResult<usize>;

    fn count_unified(&self) -> StorageResult<usize>;

    fn count_tags(&self) -> StorageResult<usize>;

    fn count_links(&self) -> StorageResult<usize>;

    /// Addresses stored with icon bytes
    fn count_with_icons(&self) -> StorageResult<usize>;

    /// Most linked tags with their address counts
    fn top_tags(&self, limit: usize) -> StorageResult<Vec<(String, usize)>>;
}
