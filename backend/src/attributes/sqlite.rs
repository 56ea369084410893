//! SQLite-backed attribute store.
//!
//! A connection is opened per lookup; the hooks call in at most once per
//! campaign and once per recipient, so there is nothing to pool.
//!
//! Schema:
//! - `attributes (id, name, listorder)`: the attribute directory.
//! - `recipient_attributes (recipient_id, attribute_id, value)`: one row per
//!   recipient and attribute that has been filled in.

use super::{AttributeStore, RecipientValues, StoreError};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

pub struct SqliteAttributeStore {
    path: PathBuf,
}

impl SqliteAttributeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the existing database; lookups never create an empty one.
    fn connect(&self) -> Result<Connection, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::Unavailable(format!(
                "{} does not exist",
                self.path.display()
            )));
        }
        Ok(Connection::open(&self.path)?)
    }

    /// Creates the database and tables if they do not exist yet. Safe to call on every start.
    pub fn init_schema(&self) -> Result<(), StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS attributes (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL,
                 listorder INTEGER NOT NULL DEFAULT 0
             );
             CREATE TABLE IF NOT EXISTS recipient_attributes (
                 recipient_id TEXT NOT NULL,
                 attribute_id INTEGER NOT NULL REFERENCES attributes(id),
                 value TEXT,
                 PRIMARY KEY (recipient_id, attribute_id)
             );",
        )?;
        Ok(())
    }
}

impl AttributeStore for SqliteAttributeStore {
    fn fetch_attribute_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT name FROM attributes ORDER BY listorder, id")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn fetch_recipient_values(&self, recipient_id: &str) -> Result<RecipientValues, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT a.name, ra.value
             FROM recipient_attributes ra
             JOIN attributes a ON a.id = ra.attribute_id
             WHERE ra.recipient_id = ?1",
        )?;
        let values = stmt
            .query_map(params![recipient_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<RecipientValues, _>>()?;
        Ok(values)
    }

    fn fetch_recipient_ids(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT recipient_id FROM recipient_attributes ORDER BY recipient_id",
        )?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}
