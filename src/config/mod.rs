//! Configuration management.
//!
//! Resolves where the registry lives and what it is called. The CLI reads
//! flags and their `REGISTRY_*` environment variables through clap; values
//! that are still unset here fall back to the defaults below.
//!
//! | Setting     | Flag / environment                   | Default                        |
//! |-------------|--------------------------------------|--------------------------------|
//! | database    | `--db` / `REGISTRY_DB`               | `~/.registry/data/registry.db` |
//! | table       | `--table` / `REGISTRY_TABLE`         | `registry`                     |
//! | cache name  | `--cache` / `REGISTRY_CACHE`         | the table name                 |
//! | cache dir   | `--cache-dir` / `REGISTRY_CACHE_DIR` | `~/.registry/cache`            |
//!
//! Each table therefore gets its own cache entry unless `--cache` names one.

use crate::error::{Error, Result};
use crate::validate::validate_table_name;

use std::path::{Path, PathBuf};

/// Default table name.
pub const DEFAULT_TABLE: &str = "registry";

/// Resolved registry settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub db_path: PathBuf,
    pub table: String,
    pub cache_name: String,
    pub cache_dir: PathBuf,
}

impl RegistryConfig {
    /// Resolve every setting from explicit values and defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the table name is not a valid identifier or
    /// no home directory is available for a defaulted path.
    pub fn resolve(
        db: Option<&Path>,
        table: Option<&str>,
        cache_name: Option<&str>,
        cache_dir: Option<&Path>,
    ) -> Result<Self> {
        let db_path = resolve_db_path(db)
            .ok_or_else(|| Error::Config("Could not determine database path".to_string()))?;
        let cache_dir = resolve_cache_dir(cache_dir)
            .ok_or_else(|| Error::Config("Could not determine cache directory".to_string()))?;

        let table = resolve_table_name(table);
        validate_table_name(&table)?;
        let cache_name = resolve_cache_name(cache_name, &table);

        Ok(Self {
            db_path,
            table,
            cache_name,
            cache_dir,
        })
    }
}

/// Get the global registry directory (`~/.registry/`).
#[must_use]
pub fn global_registry_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".registry"))
}

/// Resolve the database path: explicit, else `~/.registry/data/registry.db`.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    match explicit_path {
        Some(path) => Some(path.to_path_buf()),
        None => global_registry_dir().map(|dir| dir.join("data").join("registry.db")),
    }
}

/// Resolve the directory used by the file cache store.
#[must_use]
pub fn resolve_cache_dir(explicit_dir: Option<&Path>) -> Option<PathBuf> {
    match explicit_dir {
        Some(dir) => Some(dir.to_path_buf()),
        None => global_registry_dir().map(|dir| dir.join("cache")),
    }
}

/// Resolve the registry table name.
///
/// The result is not validated here; see [`RegistryConfig::resolve`].
#[must_use]
pub fn resolve_table_name(explicit: Option<&str>) -> String {
    explicit
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_TABLE)
        .to_string()
}

/// Resolve the cache name the mirror is stored under, defaulting to `table`.
#[must_use]
pub fn resolve_cache_name(explicit: Option<&str>, table: &str) -> String {
    explicit
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(table)
        .to_string()
}
