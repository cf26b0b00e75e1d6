//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the AddressStore trait.

use crate::harvest::AddressRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{AddressStore, StorageError, StorageResult};
use crate::storage::{StoredAddress, UnifiedAddress};
use crate::HarvestError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const UPSERT_ADDRESS: &str = "
    INSERT INTO addresses (address, name, icon, icon_url)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(address) DO UPDATE SET
        name = excluded.name,
        icon = excluded.icon,
        icon_url = excluded.icon_url
    RETURNING id";

const UPSERT_UNIFIED: &str = "
    INSERT INTO unified_addresses (address, address_name, \"type\", source)
    VALUES (?1, ?2, '', ?3)
    ON CONFLICT(address) DO UPDATE SET
        address_name = excluded.address_name,
        \"type\" = excluded.\"type\",
        source = excluded.source";

const UPSERT_TAG: &str = "
    INSERT INTO tags (tag) VALUES (?1)
    ON CONFLICT(tag) DO UPDATE SET tag = excluded.tag
    RETURNING id";

const LINK_TAG: &str = "
    INSERT INTO address_tags (address_id, tag_id) VALUES (?1, ?2)
    ON CONFLICT(address_id, tag_id) DO NOTHING";

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
    source: String,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file; missing parent directories are created
    /// * `source` - Provenance written to `unified_addresses.source`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn open(path: &Path, source: &str) -> Result<Self, HarvestError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            source: source.to_string(),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory(source: &str) -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            source: source.to_string(),
        })
    }

    /// Provenance recorded for every directory entry
    pub fn source(&self) -> &str {
        &self.source
    }

    fn write_record(&mut self, record: &AddressRecord) -> rusqlite::Result<()> {
        let tx = self.conn.transaction()?;

        let address_id: i64 = tx.query_row(
            UPSERT_ADDRESS,
            params![
                record.address,
                record.display_name,
                record.icon_bytes,
                record.icon_url
            ],
            |row| row.get(0),
        )?;

        tx.execute(
            UPSERT_UNIFIED,
            params![record.address, record.directory_name(), self.source],
        )?;

        for tag in &record.tags {
            let tag_id: i64 = tx.query_row(UPSERT_TAG, params![tag], |row| row.get(0))?;
            tx.execute(LINK_TAG, params![address_id, tag_id])?;
        }

        // Dropping `tx` on any early return rolls back
        tx.commit()
    }

    fn count(&self, table: &str) -> StorageResult<usize> {
        self.count_where(table, "1")
    }

    fn count_where(&self, table: &str, condition: &str) -> StorageResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", table, condition);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn stored_address(row: &Row<'_>) -> rusqlite::Result<StoredAddress> {
    Ok(StoredAddress {
        id: row.get(0)?,
        address: row.get(1)?,
        name: row.get(2)?,
        icon: row.get(3)?,
        icon_url: row.get(4)?,
    })
}

impl AddressStore for SqliteStore {
    fn save(&mut self, record: &AddressRecord) -> StorageResult<()> {
        if record.address.is_empty() {
            return Err(StorageError::EmptyAddress);
        }

        self.write_record(record)
            .map_err(|source| StorageError::Persistence {
                address: record.address.clone(),
                source,
            })
    }

    fn get_address(&self, address: &str) -> StorageResult<Option<StoredAddress>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, address, name, icon, icon_url FROM addresses WHERE address = ?1",
                params![address],
                stored_address,
            )
            .optional()?;
        Ok(row)
    }

    fn get_unified(&self, address: &str) -> StorageResult<Option<UnifiedAddress>> {
        let row = self
            .conn
            .query_row(
                "SELECT address, address_name, \"type\", source FROM unified_addresses WHERE address = ?1",
                params![address],
                |row| {
                    Ok(UnifiedAddress {
                        address: row.get(0)?,
                        address_name: row.get(1)?,
                        kind: row.get(2)?,
                        source: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn tags_for_address(&self, address: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.tag FROM tags t
             JOIN address_tags l ON l.tag_id = t.id
             JOIN addresses a ON a.id = l.address_id
             WHERE a.address = ?1
             ORDER BY t.tag",
        )?;

        let tags = stmt
            .query_map(params![address], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }

    fn list_addresses(&self) -> StorageResult<Vec<StoredAddress>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, address, name, icon, icon_url FROM addresses ORDER BY id")?;

        let rows = stmt
            .query_map([], stored_address)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn count_addresses(&self) -> StorageResult<usize> {
        self.count("addresses")
    }

    fn count_unified(&self) -> StorageResult<usize> {
        self.count("unified_addresses")
    }

    fn count_tags(&self) -> StorageResult<usize> {
        self.count("tags")
    }

    fn count_links(&self) -> StorageResult<usize> {
        self.count("address_tags")
    }

    fn count_with_icons(&self) -> StorageResult<usize> {
        self.count_where("addresses", "icon IS NOT NULL")
    }

    fn top_tags(&self, limit: usize) -> StorageResult<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.tag, COUNT(*) AS uses FROM address_tags l
             JOIN tags t ON t.id = l.tag_id
             GROUP BY t.id
             ORDER BY uses DESC, t.tag ASC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
