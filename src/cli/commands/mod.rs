//! Command implementations.

pub mod completions;
pub mod entry;
pub mod init;
pub mod maintenance;

use crate::cache::FileCache;
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::registry::RegistryStore;
use crate::storage::SqliteTable;
use serde_json::Value;

/// The registry as wired by the CLI.
pub type Registry = RegistryStore<SqliteTable, FileCache>;

/// Open the configured registry, requiring an initialized database.
///
/// # Errors
///
/// Returns `Error::NotInitialized` if the database file does not exist, or
/// an error if it cannot be opened.
pub fn open_registry(config: &RegistryConfig) -> Result<Registry> {
    let table = open_table(config)?;
    Ok(RegistryStore::new(
        table,
        FileCache::new(&config.cache_dir),
        config.cache_name.clone(),
    ))
}

/// Open the configured table, requiring an initialized database.
fn open_table(config: &RegistryConfig) -> Result<SqliteTable> {
    if !config.db_path.exists() {
        return Err(Error::NotInitialized);
    }
    SqliteTable::open(&config.db_path, &config.table)
}

/// Render a value for human output.
///
/// Strings print bare, everything else as (pretty) JSON.
fn render_value(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => serde_json::to_string_pretty(value)?,
        other => other.to_string(),
    })
}
