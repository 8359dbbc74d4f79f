//! Cache-aside registry over a persistent table.
//!
//! [`RegistryStore`] keeps a mirror of every entry (root key -> deserialized
//! value). The mirror is loaded lazily on first use, from the cache store if
//! it holds one, otherwise from the table in a single pass. Every mutation
//! writes the table first, then updates the mirror, then rewrites the whole
//! mirror to the cache store. A rejected table write leaves the mirror
//! untouched. A failure once the table may have changed drops both the
//! mirror and the cache entry, so the next access reloads from the table.
//!
//! Reads are total: a malformed key addresses nothing and reads as absent.
//! Writes reject malformed keys with `Error::InvalidKey` before any I/O.
//!
//! All loading and mutating operations take `&mut self`: one store instance
//! has a single writer, and the read-modify-persist sequence of `set`,
//! `overwrite` and `forget` cannot interleave with another call on it.

use crate::cache::CacheStore;
use crate::error::{Error, Result};
use crate::resolver;
use crate::storage::PersistentTable;
use crate::validate::{validate_key, validate_root_key};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Dotted-key registry backed by a [`PersistentTable`] and a [`CacheStore`].
#[derive(Debug)]
pub struct RegistryStore<T, C> {
    table: T,
    cache: C,
    cache_name: String,
    /// Root key -> entry value. `None` until loaded, and again after `flush`.
    mirror: Option<Map<String, Value>>,
}

impl<T: PersistentTable, C: CacheStore> RegistryStore<T, C> {
    /// Create a store. Nothing is loaded until the first operation.
    pub fn new(table: T, cache: C, cache_name: impl Into<String>) -> Self {
        Self {
            table,
            cache,
            cache_name: cache_name.into(),
            mirror: None,
        }
    }

    /// Get the value addressed by a dotted key.
    ///
    /// A malformed key (empty, or with an empty segment) reads as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be loaded.
    pub fn get(&mut self, key: &str) -> Result<Option<&Value>> {
        if validate_key(key).is_err() {
            return Ok(None);
        }
        let (root, path) = resolver::split(key);
        let mirror = self.ensure_loaded()?;
        Ok(mirror
            .get(root)
            .and_then(|value| resolver::read_path(value, path)))
    }

    /// Like [`get`](Self::get), returning `default` when nothing is found.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be loaded.
    pub fn get_or(&mut self, key: &str, default: Value) -> Result<Value> {
        Ok(self.get(key)?.cloned().unwrap_or(default))
    }

    /// The whole mirror, or `None` if it has not been loaded yet.
    #[must_use]
    pub fn all(&self) -> Option<&Map<String, Value>> {
        self.mirror.as_ref()
    }

    /// Load the mirror if needed and return every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be loaded.
    pub fn entries(&mut self) -> Result<&Map<String, Value>> {
        self.ensure_loaded().map(|mirror| &*mirror)
    }

    /// Create or update the value addressed by a dotted key.
    ///
    /// If the root entry exists this is [`overwrite`](Self::overwrite).
    /// Otherwise a new row is inserted holding `value`, or for a nested key
    /// the chain of objects leading to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is malformed or a write fails.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        let (root, path) = resolver::split(key);
        if self.ensure_loaded()?.contains_key(root) {
            return self.overwrite(key, value);
        }

        let entry = resolver::write_path(Value::Object(Map::new()), path, value);
        self.table.insert(root, &serde_json::to_string(&entry)?)?;
        debug!(key, root, "Created registry entry");

        self.ensure_loaded()?.insert(root.to_string(), entry);
        self.write_cache()
    }

    /// Update the value addressed by a dotted key inside an existing entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the root entry does not exist, or an
    /// error if the key is malformed or a write fails.
    pub fn overwrite(&mut self, key: &str, value: Value) -> Result<()> {
        validate_key(key)?;
        let (root, path) = resolver::split(key);
        let current = self.existing(key, root)?;

        let entry = resolver::write_path(current, path, value);
        self.table.update(root, &serde_json::to_string(&entry)?)?;
        debug!(key, root, "Overwrote registry entry");

        self.ensure_loaded()?.insert(root.to_string(), entry);
        self.write_cache()
    }

    /// Bulk upsert of whole entries.
    ///
    /// Every key is a root key; no dotted-path resolution happens. All keys
    /// are validated before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKey` for an empty or dotted key, or an error if
    /// a write fails.
    pub fn store<I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let values: Vec<(String, Value)> = values.into_iter().collect();
        for (key, _) in &values {
            validate_root_key(key)?;
        }
        let rows = values
            .iter()
            .map(|(key, value)| Ok((key.clone(), serde_json::to_string(value)?)))
            .collect::<Result<Vec<_>>>()?;
        self.ensure_loaded()?;

        if let Err(e) = self.table.upsert_many(&rows) {
            // Rows may be partially written; reload from the table
            self.discard();
            return Err(e);
        }
        debug!(count = rows.len(), "Stored registry entries");

        self.ensure_loaded()?.extend(values);
        self.write_cache()
    }

    /// Remove the value addressed by a dotted key.
    ///
    /// A bare root key deletes the whole entry; a nested key removes only
    /// that leaf from the entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the root entry does not exist, or an
    /// error if the key is malformed or a write fails.
    pub fn forget(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        let (root, path) = resolver::split(key);
        let current = self.existing(key, root)?;

        match resolver::delete_path(current, path) {
            Some(entry) => {
                self.table.update(root, &serde_json::to_string(&entry)?)?;
                debug!(key, root, "Removed value from registry entry");
                self.ensure_loaded()?.insert(root.to_string(), entry);
            }
            None => {
                self.table.delete(root)?;
                debug!(root, "Deleted registry entry");
                self.ensure_loaded()?.remove(root);
            }
        }

        self.write_cache()
    }

    /// The whole entry for the root of `key`, ignoring any deeper path.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be loaded.
    pub fn dump(&mut self, key: &str) -> Result<Option<&Value>> {
        if validate_key(key).is_err() {
            return Ok(None);
        }
        let (root, _) = resolver::split(key);
        Ok(self.ensure_loaded()?.get(root))
    }

    /// Like [`dump`](Self::dump), returning `default` when the entry is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be loaded.
    pub fn dump_or(&mut self, key: &str, default: Value) -> Result<Value> {
        Ok(self.dump(key)?.cloned().unwrap_or(default))
    }

    /// Invalidate the cache and reload the mirror from the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be invalidated or the table
    /// cannot be loaded.
    pub fn clear(&mut self) -> Result<()> {
        self.cache.invalidate(&self.cache_name)?;
        self.mirror = None;
        self.ensure_loaded()?;
        Ok(())
    }

    /// Invalidate the cache, drop the mirror and empty the table.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be invalidated or the table
    /// cannot be truncated.
    pub fn flush(&mut self) -> Result<()> {
        self.cache.invalidate(&self.cache_name)?;
        self.mirror = None;
        self.table.truncate()?;
        info!(cache = %self.cache_name, "Flushed registry");
        Ok(())
    }

    /// Consume the store, returning its table and cache.
    pub fn into_parts(self) -> (T, C) {
        (self.table, self.cache)
    }

    /// Populate the mirror if needed and return it.
    ///
    /// Loading happens at most once per uninitialized state: from the cache
    /// store when it holds a mirror, otherwise from the table, in which case
    /// the cache store is refilled.
    fn ensure_loaded(&mut self) -> Result<&mut Map<String, Value>> {
        let mirror = match self.mirror.take() {
            Some(mirror) => mirror,
            None => self.load()?,
        };
        Ok(self.mirror.insert(mirror))
    }

    fn load(&mut self) -> Result<Map<String, Value>> {
        if let Some(cached) = self.cache.get(&self.cache_name)? {
            debug!(cache = %self.cache_name, entries = cached.len(), "Loaded mirror from cache");
            return Ok(cached);
        }

        let loaded = self.load_table()?;
        self.cache.put(&self.cache_name, &loaded)?;
        info!(cache = %self.cache_name, entries = loaded.len(), "Rebuilt mirror from table");
        Ok(loaded)
    }

    /// Deserialize every persisted row.
    fn load_table(&self) -> Result<Map<String, Value>> {
        self.table
            .get_all()?
            .into_iter()
            .map(|(key, raw)| match serde_json::from_str(&raw) {
                Ok(value) => Ok((key, value)),
                Err(source) => Err(Error::CorruptData { key, source }),
            })
            .collect()
    }

    /// A copy of the entry for `root`, or `NotFound` naming `key`.
    fn existing(&mut self, key: &str, root: &str) -> Result<Value> {
        self.ensure_loaded()?
            .get(root)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                key: key.to_string(),
            })
    }

    /// Rewrite the whole mirror to the cache store.
    ///
    /// Runs after the table has been written. If the cache store rejects the
    /// mirror, both the mirror and the cache entry are dropped so the next
    /// access rebuilds them from the table.
    fn write_cache(&mut self) -> Result<()> {
        let Some(mirror) = &self.mirror else {
            return Ok(());
        };
        if let Err(e) = self.cache.put(&self.cache_name, mirror) {
            self.discard();
            return Err(e);
        }
        Ok(())
    }

    /// Forget the mirror and the cached copy after a partial write.
    fn discard(&mut self) {
        self.mirror = None;
        if let Err(e) = self.cache.invalidate(&self.cache_name) {
            warn!(cache = %self.cache_name, error = %e, "Could not invalidate cache after failed write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::SqliteTable;
    use serde_json::json;

    fn registry() -> RegistryStore<SqliteTable, MemoryCache> {
        let table = SqliteTable::open_memory("registry").unwrap();
        RegistryStore::new(table, MemoryCache::new(), "registry")
    }

    fn row_count(store: RegistryStore<SqliteTable, MemoryCache>) -> usize {
        let (table, _) = store.into_parts();
        table.get_all().unwrap().len()
    }

    #[test]
    fn test_set_and_get_root() {
        let mut store = registry();
        store.set("twosuperior", json!({"foo": "bar"})).unwrap();

        assert_eq!(store.get("twosuperior").unwrap(), Some(&json!({"foo": "bar"})));
        assert_eq!(store.get("twosuperior.foo").unwrap(), Some(&json!("bar")));
    }

    #[test]
    fn test_scenario_overwrite_nested() {
        let mut store = registry();
        store.set("twosuperior", json!({"foo": "bar"})).unwrap();
        assert_eq!(store.get("twosuperior.foo").unwrap(), Some(&json!("bar")));

        store.overwrite("twosuperior.foo", json!("foobar")).unwrap();
        assert_eq!(store.get("twosuperior").unwrap(), Some(&json!({"foo": "foobar"})));
    }

    #[test]
    fn test_set_nested_on_absent_root_builds_skeleton() {
        let mut store = registry();
        store.set("a.b", json!(1)).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(&json!({"b": 1})));
        assert_eq!(store.get("a.b").unwrap(), Some(&json!(1)));

        store.set("x.y.z", json!("deep")).unwrap();
        assert_eq!(store.get("x").unwrap(), Some(&json!({"y": {"z": "deep"}})));
    }

    #[test]
    fn test_set_nested_segment_named_like_root() {
        let mut store = registry();
        store.set("a.a", json!(1)).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_set_twice_is_overwrite() {
        let mut store = registry();
        store.set("root", json!("v1")).unwrap();
        store.set("root", json!("v2")).unwrap();

        assert_eq!(store.get("root").unwrap(), Some(&json!("v2")));
        assert_eq!(row_count(store), 1);
    }

    #[test]
    fn test_set_nested_on_existing_root_merges() {
        let mut store = registry();
        store.set("app", json!({"name": "demo"})).unwrap();
        store.set("app.feature.enabled", json!(true)).unwrap();

        assert_eq!(
            store.get("app").unwrap(),
            Some(&json!({"name": "demo", "feature": {"enabled": true}}))
        );
    }

    #[test]
    fn test_get_missing_returns_default() {
        let mut store = registry();
        assert_eq!(store.get("foobar").unwrap(), None);
        assert_eq!(store.get_or("foobar", json!("fallback")).unwrap(), json!("fallback"));

        store.set("a", json!({"b": 1})).unwrap();
        assert_eq!(store.get("a.c").unwrap(), None);
        assert_eq!(store.get_or("a.b.c", json!(0)).unwrap(), json!(0));
    }

    #[test]
    fn test_stored_null_is_a_value() {
        let mut store = registry();
        store.set("nothing", Value::Null).unwrap();
        assert_eq!(store.get_or("nothing", json!("default")).unwrap(), Value::Null);
    }

    #[test]
    fn test_overwrite_missing_root_fails() {
        let mut store = registry();
        let err = store.overwrite("foobar", json!(1)).unwrap_err();
        assert!(matches!(err, Error::NotFound { ref key } if key == "foobar"));

        let err = store.overwrite("foobar.baz", json!(1)).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_overwrite_whole_entry() {
        let mut store = registry();
        store.set("a", json!({"b": 1})).unwrap();
        store.overwrite("a", json!([1, 2, 3])).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_overwrite_nested_through_scalar_root() {
        let mut store = registry();
        store.set("a", json!("scalar")).unwrap();
        store.overwrite("a.b", json!(1)).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(&json!({"b": 1})));
    }

    #[test]
    fn test_forget_nested_leaf() {
        let mut store = registry();
        store.set("a", json!({"b": "v", "c": "w"})).unwrap();

        store.forget("a.b").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(&json!({"c": "w"})));
        assert_eq!(store.get("a.b").unwrap(), None);
    }

    #[test]
    fn test_forget_last_leaf_keeps_entry() {
        let mut store = registry();
        store.set("twosuperior", json!({"foo": "bar"})).unwrap();

        store.forget("twosuperior.foo").unwrap();
        assert_eq!(store.get("twosuperior").unwrap(), Some(&json!({})));
    }

    #[test]
    fn test_forget_missing_leaf_is_noop() {
        let mut store = registry();
        store.set("a", json!({"b": 1})).unwrap();

        store.forget("a.x.y").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(&json!({"b": 1})));
    }

    #[test]
    fn test_forget_whole_entry() {
        let mut store = registry();
        store.set("twosuperior", json!({"foo": "bar"})).unwrap();

        store.forget("twosuperior").unwrap();
        assert_eq!(store.get("twosuperior").unwrap(), None);
        assert!(!store.all().unwrap().contains_key("twosuperior"));
        assert_eq!(row_count(store), 0);
    }

    #[test]
    fn test_forget_missing_root_fails() {
        let mut store = registry();
        assert!(matches!(store.forget("foobar"), Err(Error::NotFound { .. })));
        assert!(matches!(store.forget("foobar.x"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_store_upserts_root_keys() {
        let mut store = registry();
        store.set("existing", json!(1)).unwrap();

        store
            .store([
                ("existing".to_string(), json!(2)),
                ("fresh".to_string(), json!({"k": "v"})),
            ])
            .unwrap();

        assert_eq!(store.get("existing").unwrap(), Some(&json!(2)));
        assert_eq!(store.get("fresh.k").unwrap(), Some(&json!("v")));
        assert_eq!(row_count(store), 2);
    }

    #[test]
    fn test_store_rejects_dotted_keys_before_writing() {
        let mut store = registry();
        let result = store.store([
            ("good".to_string(), json!(1)),
            ("bad.key".to_string(), json!(2)),
        ]);

        assert!(matches!(result, Err(Error::InvalidKey { .. })));
        assert_eq!(store.get("good").unwrap(), None);
    }

    #[test]
    fn test_dump_ignores_path() {
        let mut store = registry();
        store.set("twosuperior", json!({"foo": "bar"})).unwrap();

        assert_eq!(store.dump("twosuperior").unwrap(), Some(&json!({"foo": "bar"})));
        assert_eq!(store.dump("twosuperior.foo").unwrap(), Some(&json!({"foo": "bar"})));
        assert_eq!(store.dump_or("missing", json!(null)).unwrap(), json!(null));
    }

    #[test]
    fn test_all_before_and_after_load() {
        let mut store = registry();
        assert!(store.all().is_none());

        store.get("anything").unwrap();
        assert_eq!(store.all(), Some(&Map::new()));

        store.set("a", json!(1)).unwrap();
        assert_eq!(store.all().unwrap().get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_entries_loads_mirror() {
        let mut table = SqliteTable::open_memory("registry").unwrap();
        table.insert("a", "1").unwrap();

        let mut store = RegistryStore::new(table, MemoryCache::new(), "registry");
        assert!(store.all().is_none());
        assert_eq!(store.entries().unwrap().get("a"), Some(&json!(1)));
        assert!(store.all().is_some());
    }

    #[test]
    fn test_flush_resets_everything() {
        let mut store = registry();
        store.set("a", json!(1)).unwrap();
        store.set("b.c", json!(2)).unwrap();

        store.flush().unwrap();
        assert!(store.all().is_none());
        assert_eq!(store.get_or("a", json!("default")).unwrap(), json!("default"));
        assert_eq!(store.get("b.c").unwrap(), None);

        // First-time creation works again
        store.set("a", json!(3)).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(&json!(3)));
        assert_eq!(row_count(store), 1);
    }

    #[test]
    fn test_mutations_rewrite_cache() {
        let mut store = registry();
        store.set("a.b", json!(1)).unwrap();
        store.store([("c".to_string(), json!(2))]).unwrap();

        let (_, cache) = store.into_parts();
        let cached = cache.get("registry").unwrap().unwrap();
        assert_eq!(cached.get("a"), Some(&json!({"b": 1})));
        assert_eq!(cached.get("c"), Some(&json!(2)));
    }

    #[test]
    fn test_lazy_load_from_table() {
        let mut table = SqliteTable::open_memory("registry").unwrap();
        table.insert("twosuperior", r#"{"foo":"bar"}"#).unwrap();

        let mut store = RegistryStore::new(table, MemoryCache::new(), "registry");
        assert_eq!(store.get("twosuperior.foo").unwrap(), Some(&json!("bar")));

        // The cold load also populated the cache store
        let (_, cache) = store.into_parts();
        assert!(cache.get("registry").unwrap().is_some());
    }

    #[test]
    fn test_warm_cache_is_preferred() {
        let mut table = SqliteTable::open_memory("registry").unwrap();
        table.insert("a", "1").unwrap();

        let mut cache = MemoryCache::new();
        let mut cached = Map::new();
        cached.insert("a".to_string(), json!("from cache"));
        cache.put("registry", &cached).unwrap();

        let mut store = RegistryStore::new(table, cache, "registry");
        assert_eq!(store.get("a").unwrap(), Some(&json!("from cache")));

        // clear() drops the stale cache and rebuilds from the table
        store.clear().unwrap();
        assert_eq!(store.get("a").unwrap(), Some(&json!(1)));

        let (_, cache) = store.into_parts();
        assert_eq!(cache.get("registry").unwrap().unwrap().get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_corrupt_row_fails_load() {
        let mut table = SqliteTable::open_memory("registry").unwrap();
        table.insert("broken", "{not json").unwrap();

        let mut store = RegistryStore::new(table, MemoryCache::new(), "registry");
        let err = store.get("broken").unwrap_err();
        assert!(matches!(err, Error::CorruptData { ref key, .. } if key == "broken"));
        assert!(store.all().is_none());
    }

    #[test]
    fn test_failed_write_leaves_mirror_untouched() {
        let mut table = SqliteTable::open_memory("registry").unwrap();
        table.insert("a", r#"{"b":1}"#).unwrap();

        let mut store = RegistryStore::new(table, MemoryCache::new(), "registry");
        store.get("a").unwrap();

        // Remove the row behind the mirror's back
        store
            .table
            .conn()
            .execute("DELETE FROM registry WHERE key = 'a'", [])
            .unwrap();

        assert!(matches!(store.overwrite("a.b", json!(2)), Err(Error::NotFound { .. })));
        assert_eq!(store.get("a").unwrap(), Some(&json!({"b": 1})));
    }

    #[test]
    fn test_invalid_keys_rejected_by_writes() {
        let mut store = registry();
        assert!(matches!(store.set("", json!(1)), Err(Error::InvalidKey { .. })));
        assert!(matches!(store.set("a..b", json!(1)), Err(Error::InvalidKey { .. })));
        assert!(matches!(store.overwrite("a.", json!(1)), Err(Error::InvalidKey { .. })));
        assert!(matches!(store.forget(".a"), Err(Error::InvalidKey { .. })));
    }

    #[test]
    fn test_malformed_keys_read_as_absent() {
        let mut store = registry();
        store.set("a", json!({"b": 1})).unwrap();

        assert_eq!(store.get("").unwrap(), None);
        assert_eq!(store.get_or("", json!("d")).unwrap(), json!("d"));
        assert_eq!(store.get_or("a.", json!("d")).unwrap(), json!("d"));
        assert_eq!(store.get_or("a..b", json!("d")).unwrap(), json!("d"));
        assert_eq!(store.dump(".a").unwrap(), None);
        assert_eq!(store.dump_or(".a", json!("d")).unwrap(), json!("d"));
    }

    /// Table whose upserts start failing after a number of successes.
    struct FlakyTable {
        inner: SqliteTable,
        upserts_left: usize,
    }

    impl PersistentTable for FlakyTable {
        fn get_all(&self) -> Result<Vec<(String, String)>> {
            self.inner.get_all()
        }

        fn insert(&mut self, key: &str, value: &str) -> Result<()> {
            self.inner.insert(key, value)
        }

        fn update(&mut self, key: &str, value: &str) -> Result<()> {
            self.inner.update(key, value)
        }

        fn upsert(&mut self, key: &str, value: &str) -> Result<()> {
            if self.upserts_left == 0 {
                return Err(Error::Config("table unavailable".to_string()));
            }
            self.upserts_left -= 1;
            self.inner.upsert(key, value)
        }

        fn delete(&mut self, key: &str) -> Result<()> {
            self.inner.delete(key)
        }

        fn truncate(&mut self) -> Result<()> {
            self.inner.truncate()
        }
    }

    /// Cache store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyCache {
        inner: MemoryCache,
        reject_puts: bool,
    }

    impl CacheStore for FlakyCache {
        fn get(&self, name: &str) -> Result<Option<Map<String, Value>>> {
            self.inner.get(name)
        }

        fn put(&mut self, name: &str, mirror: &Map<String, Value>) -> Result<()> {
            if self.reject_puts {
                return Err(Error::Config("cache unavailable".to_string()));
            }
            self.inner.put(name, mirror)
        }

        fn invalidate(&mut self, name: &str) -> Result<()> {
            self.inner.invalidate(name)
        }
    }

    #[test]
    fn test_partial_store_drops_stale_cache() {
        let table = FlakyTable {
            inner: SqliteTable::open_memory("registry").unwrap(),
            upserts_left: 1,
        };
        let mut store = RegistryStore::new(table, MemoryCache::new(), "registry");
        store.get("anything").unwrap();

        let result = store.store([
            ("first".to_string(), json!(1)),
            ("second".to_string(), json!(2)),
        ]);
        assert!(matches!(result, Err(Error::Config(_))));
        assert!(store.all().is_none());

        // A fresh store over the same table and cache sees the persisted row
        let (mut table, cache) = store.into_parts();
        assert!(cache.get("registry").unwrap().is_none());
        table.upserts_left = usize::MAX;

        let mut store = RegistryStore::new(table, cache, "registry");
        assert_eq!(store.get("first").unwrap(), Some(&json!(1)));
        store.set("first", json!(9)).unwrap();
        assert_eq!(store.get("first").unwrap(), Some(&json!(9)));
    }

    #[test]
    fn test_rejected_cache_write_reloads_from_table() {
        let table = SqliteTable::open_memory("registry").unwrap();
        let mut store = RegistryStore::new(table, FlakyCache::default(), "registry");
        store.set("a", json!(1)).unwrap();

        store.cache.reject_puts = true;
        assert!(store.set("b", json!(2)).is_err());
        assert!(store.all().is_none());
        assert!(store.cache.get("registry").unwrap().is_none());

        store.cache.reject_puts = false;
        assert_eq!(store.get("b").unwrap(), Some(&json!(2)));
        assert_eq!(store.get("a").unwrap(), Some(&json!(1)));
    }

    #[test]
    fn test_store_many_rows() {
        let mut store = registry();
        store
            .store([
                ("a".to_string(), json!(1)),
                ("b".to_string(), json!(2)),
                ("c".to_string(), json!(3)),
            ])
            .unwrap();

        assert_eq!(store.entries().unwrap().len(), 3);
        assert_eq!(row_count(store), 3);
    }
}
