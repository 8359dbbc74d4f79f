//! Cache and schema maintenance commands.

use super::open_registry;
use crate::cache::{CacheStore, FileCache};
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::storage::migrations::{applied_migrations, rollback_migrations};
use crate::storage::SqliteTable;
use colored::Colorize;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct ClearOutput<'a> {
    cache: &'a str,
    entries: usize,
}

#[derive(Serialize)]
struct FlushOutput<'a> {
    table: &'a str,
    flushed: bool,
}

#[derive(Serialize)]
struct MigrateOutput<'a> {
    table: &'a str,
    applied: Vec<&'static str>,
    reverted: usize,
}

/// Execute `reg clear`: drop the cached mirror and rebuild it from the table.
pub fn execute_clear(config: &RegistryConfig, json: bool) -> Result<()> {
    let mut registry = open_registry(config)?;
    registry.clear()?;
    let entries = registry.all().map_or(0, serde_json::Map::len);

    if json {
        let output = ClearOutput {
            cache: &config.cache_name,
            entries,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} Rebuilt cache with {entries} entries", "✓".green());
    }

    Ok(())
}

/// Execute `reg flush`: delete every entry.
pub fn execute_flush(config: &RegistryConfig, json: bool) -> Result<()> {
    let mut registry = open_registry(config)?;
    registry.flush()?;

    if json {
        let output = FlushOutput {
            table: &config.table,
            flushed: true,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{} Flushed table {}", "✓".green(), config.table);
    }

    Ok(())
}

/// Execute `reg migrate`.
///
/// Without `rollback`, applies pending migrations and reports the ones that
/// ran. With `rollback`, reverts every migration for the table (dropping it)
/// and invalidates the cached mirror.
pub fn execute_migrate(rollback: bool, config: &RegistryConfig, json: bool) -> Result<()> {
    if !config.db_path.exists() {
        return Err(Error::NotInitialized);
    }

    let (applied, reverted) = if rollback {
        let conn = Connection::open(&config.db_path)?;
        let reverted = rollback_migrations(&conn, &config.table)?;
        FileCache::new(&config.cache_dir).invalidate(&config.cache_name)?;
        info!(table = %config.table, reverted, "Rolled back registry table");
        (Vec::new(), reverted)
    } else {
        let before = {
            let conn = Connection::open(&config.db_path)?;
            applied_migrations(&conn, &config.table)?
        };
        let table = SqliteTable::open(&config.db_path, &config.table)?;
        let applied = applied_migrations(table.conn(), table.table())?
            .into_iter()
            .filter(|version| !before.contains(version))
            .collect();
        (applied, 0)
    };

    if json {
        let output = MigrateOutput {
            table: &config.table,
            applied,
            reverted,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if rollback {
        println!(
            "{} Reverted {reverted} migrations on table {}",
            "✓".green(),
            config.table
        );
    } else if applied.is_empty() {
        println!("Table {} is up to date.", config.table);
    } else {
        println!("{} Applied {} migrations:", "✓".green(), applied.len());
        for version in &applied {
            println!("  {version}");
        }
    }

    Ok(())
}
