//! Dotted-key registry backed by a persistent table and a cache store.
//!
//! Values are addressed by dotted keys such as `app.feature.enabled`: the
//! first segment names a row, the rest is a path into that row's JSON value.
//! The `reg` binary wires the registry to SQLite and a file cache.
//!
//! # Architecture
//!
//! - [`resolver`] - Dotted-key parsing and nested value read/write/delete
//! - [`registry`] - Cache-aside [`RegistryStore`]
//! - [`storage`] - [`PersistentTable`] and its SQLite implementation
//! - [`cache`] - [`CacheStore`] implementations
//! - [`config`] - Path and name resolution
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling
//!
//! # Example
//!
//! ```
//! use registry::{MemoryCache, RegistryStore, SqliteTable};
//! use serde_json::json;
//!
//! let table = SqliteTable::open_memory("registry")?;
//! let mut store = RegistryStore::new(table, MemoryCache::new(), "registry");
//!
//! store.set("twosuperior", json!({"foo": "bar"}))?;
//! store.overwrite("twosuperior.foo", json!("foobar"))?;
//! assert_eq!(store.get("twosuperior.foo")?, Some(&json!("foobar")));
//! # Ok::<(), registry::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod storage;
pub mod validate;

pub use cache::{CacheStore, FileCache, MemoryCache};
pub use error::{Error, Result};
pub use registry::RegistryStore;
pub use storage::{PersistentTable, SqliteTable};
