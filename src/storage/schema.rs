//! Database schema setup.
//!
//! The registry table and the `schema_migrations` bookkeeping table are
//! created by the versioned migrations in [`super::migrations`]; this module
//! sets connection pragmas before running them.

use rusqlite::{Connection, Result};

/// Apply pragmas and pending migrations for `table`.
///
/// `table` must already be a validated identifier.
///
/// # Errors
///
/// Returns an error if a pragma or a migration fails.
pub fn apply_schema(conn: &Connection, table: &str) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;

    super::migrations::run_migrations(conn, table)?;

    Ok(())
}

/// Check if a table exists.
#[cfg(test)]
pub(crate) fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?
        .exists([table])
}

/// Check if a column exists in a table.
#[cfg(test)]
pub(crate) fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let sql = format!("SELECT 1 FROM pragma_table_info('{table}') WHERE name = ?1");
    conn.prepare(&sql)?.exists([column])
}
