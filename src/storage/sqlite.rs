//! SQLite storage implementation.
//!
//! Every write runs inside an IMMEDIATE transaction via [`SqliteTable::mutate`].

use crate::error::{Error, Result};
use crate::storage::schema::apply_schema;
use crate::storage::PersistentTable;
use crate::validate::validate_table_name;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// SQLite-backed registry table.
#[derive(Debug)]
pub struct SqliteTable {
    conn: Connection,
    table: String,
}

impl SqliteTable {
    /// Open a database at the given path and use `table` for entries.
    ///
    /// Creates the database file and applies migrations if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is invalid, the connection cannot
    /// be established, or a migration fails.
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        Self::open_with_timeout(path, table, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is invalid, the connection cannot
    /// be established, or a migration fails.
    pub fn open_with_timeout(path: &Path, table: &str, timeout_ms: Option<u64>) -> Result<Self> {
        validate_table_name(table)?;
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn, table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the table name is invalid or the connection cannot
    /// be established.
    pub fn open_memory(table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn, table)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Name of the entries table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Execute a write inside an IMMEDIATE transaction.
    ///
    /// The closure receives the transaction and the quoted table name. The
    /// transaction is rolled back if the closure fails.
    fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &str) -> Result<R>,
    {
        let table = format!("\"{}\"", self.table);
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let result = f(&tx, &table)?;

        tx.commit()?;
        debug!(op, table = %self.table, "Committed registry write");

        Ok(result)
    }
}

/// Insert-or-update statement for a quoted table name.
fn upsert_sql(table: &str) -> String {
    format!(
        "INSERT INTO {table} (\"key\", \"value\", updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(\"key\") DO UPDATE SET
           \"value\" = excluded.\"value\",
           updated_at = excluded.updated_at"
    )
}

impl PersistentTable for SqliteTable {
    fn get_all(&self) -> Result<Vec<(String, String)>> {
        let sql = format!(
            "SELECT \"key\", \"value\" FROM \"{}\" ORDER BY \"key\" ASC",
            self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("insert", |tx, table| {
            tx.execute(
                &format!("INSERT INTO {table} (\"key\", \"value\", updated_at) VALUES (?1, ?2, ?3)"),
                rusqlite::params![key, value, now],
            )?;
            Ok(())
        })
    }

    fn update(&mut self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("update", |tx, table| {
            let rows = tx.execute(
                &format!("UPDATE {table} SET \"value\" = ?2, updated_at = ?3 WHERE \"key\" = ?1"),
                rusqlite::params![key, value, now],
            )?;
            if rows == 0 {
                return Err(Error::NotFound {
                    key: key.to_string(),
                });
            }
            Ok(())
        })
    }

    fn upsert(&mut self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("upsert", |tx, table| {
            tx.execute(&upsert_sql(table), rusqlite::params![key, value, now])?;
            Ok(())
        })
    }

    fn upsert_many(&mut self, rows: &[(String, String)]) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.mutate("upsert_many", |tx, table| {
            let mut stmt = tx.prepare(&upsert_sql(table))?;
            for (key, value) in rows {
                stmt.execute(rusqlite::params![key, value, now])?;
            }
            debug!(rows = rows.len(), "Upserted registry rows");
            Ok(())
        })
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.mutate("delete", |tx, table| {
            let rows = tx.execute(&format!("DELETE FROM {table} WHERE \"key\" = ?1"), [key])?;
            if rows == 0 {
                return Err(Error::NotFound {
                    key: key.to_string(),
                });
            }
            Ok(())
        })
    }

    fn truncate(&mut self) -> Result<()> {
        self.mutate("truncate", |tx, table| {
            let rows = tx.execute(&format!("DELETE FROM {table}"), [])?;
            debug!(rows, "Truncated registry table");
            Ok(())
        })
    }
}
