//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Tag-Harvester database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per scraped address
CREATE TABLE IF NOT EXISTS addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    address TEXT NOT NULL UNIQUE,
    name TEXT,
    icon BLOB,
    icon_url TEXT
);

-- Address directory shared with other sources
CREATE TABLE IF NOT EXISTS unified_addresses (
    address TEXT PRIMARY KEY,
    address_name TEXT NOT NULL,
    "type" TEXT NOT NULL DEFAULT '',
    source TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_unified_source ON unified_addresses(source);

-- Tag catalog
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    tag TEXT NOT NULL UNIQUE
);

-- Address/tag links
CREATE TABLE IF NOT EXISTS address_tags (
    address_id INTEGER NOT NULL REFERENCES addresses(id),
    tag_id INTEGER NOT NULL REFERENCES tags(id),
    PRIMARY KEY (address_id, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_address_tags_tag ON address_tags(tag_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
