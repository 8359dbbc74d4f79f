//! File-backed cache store.
//!
//! Each cache name maps to `<dir>/<sanitized name>.json`. Writes go to a temp
//! file which is then renamed over the final path, so a concurrent reader
//! sees either the old mirror or the new one.
//!
//! The persistent table is the source of truth: a cache file that cannot be
//! read or parsed is reported as a miss and the registry rebuilds it.

use crate::cache::CacheStore;
use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::io::{ErrorKind, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Cache store persisting each mirror as a JSON file.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Use `dir` for cache files. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let file = sanitize_name(name)
            .ok_or_else(|| Error::Config(format!("invalid cache name '{name}'")))?;
        Ok(self.dir.join(format!("{file}.json")))
    }
}

/// Sanitize a cache name for use as a filename.
fn sanitize_name(name: &str) -> Option<String> {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == ':' || c == '*' || c == '?'
               || c == '"' || c == '<' || c == '>' || c == '|' || c.is_whitespace() {
                '_'
            } else {
                c
            }
        })
        .take(100)
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        None
    } else {
        Some(sanitized)
    }
}

impl CacheStore for FileCache {
    fn get(&self, name: &str) -> Result<Option<Map<String, Value>>> {
        let path = self.path_for(name)?;

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cache file, ignoring");
                return Ok(None);
            }
        };

        match serde_json::from_str(&content) {
            Ok(mirror) => Ok(Some(mirror)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache file, ignoring");
                Ok(None)
            }
        }
    }

    fn put(&mut self, name: &str, mirror: &Map<String, Value>) -> Result<()> {
        let file_path = self.path_for(name)?;
        let temp_path = file_path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(mirror)?;

        {
            let mut opts = fs::OpenOptions::new();
            opts.write(true).create(true).truncate(true);
            #[cfg(unix)]
            opts.mode(0o600);
            let mut file = opts.open(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.flush()?;
        }
        fs::rename(&temp_path, &file_path)?;

        debug!(path = %file_path.display(), entries = mirror.len(), "Wrote cache file");
        Ok(())
    }

    fn invalidate(&mut self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            // Already clear
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mirror() -> Map<String, Value> {
        let mut mirror = Map::new();
        mirror.insert("twosuperior".to_string(), json!({"foo": "bar"}));
        mirror
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("registry"), Some("registry".to_string()));
        assert_eq!(sanitize_name("app/settings"), Some("app_settings".to_string()));
        assert_eq!(sanitize_name("with spaces"), Some("with_spaces".to_string()));
        assert_eq!(sanitize_name(""), None);
        assert_eq!(sanitize_name("   "), None);
        assert_eq!(sanitize_name(".."), None);
    }

    #[test]
    fn test_put_get_invalidate() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path().join("cache"));

        assert!(cache.get("registry").unwrap().is_none());

        cache.put("registry", &mirror()).unwrap();
        assert!(dir.path().join("cache").join("registry.json").exists());
        assert_eq!(cache.get("registry").unwrap(), Some(mirror()));

        cache.invalidate("registry").unwrap();
        assert!(cache.get("registry").unwrap().is_none());

        // Invalidating twice is fine
        cache.invalidate("registry").unwrap();
    }

    #[test]
    fn test_shared_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FileCache::new(dir.path());
        writer.put("registry", &mirror()).unwrap();

        let reader = FileCache::new(dir.path());
        assert_eq!(reader.get("registry").unwrap(), Some(mirror()));
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("registry.json"), "{not json").unwrap();

        let cache = FileCache::new(dir.path());
        assert!(cache.get("registry").unwrap().is_none());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = FileCache::new(dir.path());
        cache.put("registry", &mirror()).unwrap();

        assert!(!dir.path().join("registry.json.tmp").exists());
    }

    #[test]
    fn test_invalid_name() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        assert!(matches!(cache.get(""), Err(Error::Config(_))));
    }
}
