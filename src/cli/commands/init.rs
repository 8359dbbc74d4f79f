//! Initialize the registry database.
//!
//! Creates the database file (and its parent directory) and applies the
//! registry table migrations. Every other data command refuses to run until
//! this has happened, so a mistyped `--db` never silently creates a new
//! empty registry.

use crate::cache::{CacheStore, FileCache};
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::storage::SqliteTable;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct InitOutput<'a> {
    path: &'a Path,
    table: &'a str,
    cache_dir: &'a Path,
}

/// Execute the init command.
///
/// With `force`, an existing database (and its WAL files) is deleted and the
/// cached mirror invalidated before recreating it.
///
/// # Errors
///
/// Returns `Error::AlreadyInitialized` if the database exists and `force` is
/// not set, or an error if the directory or database cannot be created.
pub fn execute(config: &RegistryConfig, force: bool, json: bool) -> Result<()> {
    let db_path = &config.db_path;
    if db_path.exists() {
        if !force {
            return Err(Error::AlreadyInitialized {
                path: db_path.clone(),
            });
        }
        remove_database(db_path)?;
        FileCache::new(&config.cache_dir).invalidate(&config.cache_name)?;
        info!(path = %db_path.display(), "Removed existing registry database");
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Opening applies the schema and migrations
    let table = SqliteTable::open(db_path, &config.table)?;

    if json {
        let output = InitOutput {
            path: db_path,
            table: table.table(),
            cache_dir: &config.cache_dir,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Initialized registry database");
        println!("  Database: {}", db_path.display());
        println!("  Table:    {}", table.table());
        println!("  Cache:    {}", config.cache_dir.display());
    }

    Ok(())
}

/// Delete a database file along with its `-wal` and `-shm` companions.
fn remove_database(db_path: &Path) -> Result<()> {
    for path in [
        db_path.to_path_buf(),
        sidecar(db_path, "-wal"),
        sidecar(db_path, "-shm"),
    ] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn sidecar(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
