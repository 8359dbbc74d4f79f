//! Cache stores for the registry mirror.
//!
//! The registry keeps its whole mirror under one cache name and rewrites it
//! after every mutation. Entries never expire; they are only replaced or
//! invalidated.
//!
//! - [`MemoryCache`] - process-local map, for embedding and tests
//! - [`FileCache`] - one JSON file per cache name, shared across processes

mod file;

pub use file::FileCache;

use crate::error::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Named storage for a serialized registry mirror.
pub trait CacheStore {
    /// Fetch the mirror stored under `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, name: &str) -> Result<Option<Map<String, Value>>>;

    /// Store `mirror` under `name` with no expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn put(&mut self, name: &str, mirror: &Map<String, Value>) -> Result<()>;

    /// Drop whatever is stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn invalidate(&mut self, name: &str) -> Result<()>;
}

/// In-process cache store.
#[derive(Debug, Default, Clone)]
pub struct MemoryCache {
    entries: HashMap<String, Map<String, Value>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, name: &str) -> Result<Option<Map<String, Value>>> {
        Ok(self.entries.get(name).cloned())
    }

    fn put(&mut self, name: &str, mirror: &Map<String, Value>) -> Result<()> {
        self.entries.insert(name.to_string(), mirror.clone());
        Ok(())
    }

    fn invalidate(&mut self, name: &str) -> Result<()> {
        self.entries.remove(name);
        Ok(())
    }
}
