//! Persistent storage for registry entries.
//!
//! Entries are `(key, value)` rows where `value` is serialized JSON. The
//! registry talks to storage through [`PersistentTable`]; [`SqliteTable`] is
//! the bundled implementation.
//!
//! # Submodules
//!
//! - [`migrations`] - Versioned registry table migrations
//! - [`schema`] - Connection pragmas and bookkeeping schema
//! - [`sqlite`] - SQLite-backed `PersistentTable`

pub mod migrations;
pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteTable;

use crate::error::Result;

/// A table of serialized registry entries keyed by root key.
pub trait PersistentTable {
    /// Load every row as `(key, serialized value)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be read.
    fn get_all(&self) -> Result<Vec<(String, String)>>;

    /// Insert a new row. Fails if `key` already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    fn insert(&mut self, key: &str, value: &str) -> Result<()>;

    /// Replace the value of an existing row.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no row has `key`.
    fn update(&mut self, key: &str, value: &str) -> Result<()>;

    /// Insert a row, or update it in place if `key` already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn upsert(&mut self, key: &str, value: &str) -> Result<()>;

    /// Upsert several rows.
    ///
    /// The default upserts row by row and can stop part way through.
    /// Implementations with transactions should write all rows or none.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    fn upsert_many(&mut self, rows: &[(String, String)]) -> Result<()> {
        for (key, value) in rows {
            self.upsert(key, value)?;
        }
        Ok(())
    }

    /// Delete the row for `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if no row has `key`.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Remove every row.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be emptied.
    fn truncate(&mut self) -> Result<()>;
}
