use dashmap::DashMap;
use log::{debug, info, trace};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crate::error::{AnalyzeError, Result};
use crate::source_file::SourceFileRecord;

const CACHE_FILE_NAME: &str = "source-files.json";

/// The memoization store for per-file analysis: one record per
/// absolute file path, shared by every graph built in a run, with
/// optional persistence between runs.
///
/// An explicit instance, constructed once and passed by reference -
/// independent crawls in one process get independent caches.
pub struct SourceFileCache {
    store: DashMap<PathBuf, SourceFileRecord>,
    location: PathBuf,
}

impl SourceFileCache {
    /// `location` is the directory the persisted snapshot lives in;
    /// it is created on the first write.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self { store: DashMap::new(), location: location.into() }
    }

    /// The file the snapshot is persisted to.
    pub fn file_path(&self) -> PathBuf {
        self.location.join(CACHE_FILE_NAME)
    }

    pub fn get(&self, key: &Path) -> Option<SourceFileRecord> {
        self.store.get(key).map(|entry| entry.clone())
    }

    /// Store a record, silently overwriting any previous one, and
    /// hand the stored value back.
    pub fn set(&self, key: PathBuf, value: SourceFileRecord) -> SourceFileRecord {
        trace!("Cache entry for {}", key.display());
        self.store.insert(key, value.clone());
        value
    }

    pub fn has(&self, key: &Path) -> bool {
        self.store.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Deterministic JSON encoding of the full store: an object with
    /// sorted path keys whose values are each record's own JSON
    /// serialization (a string, not a nested object).
    pub fn serialize(&self) -> Result<String> {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for entry in self.store.iter() {
            let serialized = entry.value().to_json().map_err(|e| self.io_error(e))?;
            map.insert(entry.key().to_string_lossy().to_string(), serialized);
        }
        serde_json::to_string(&map).map_err(|e| self.io_error(e))
    }

    /// Persist the store, creating the cache directory if needed.
    pub fn write_to_file(&self) -> Result<()> {
        fs::create_dir_all(&self.location).map_err(|e| self.io_error(e))?;
        let serialized = self.serialize()?;
        fs::write(self.file_path(), serialized).map_err(|e| self.io_error(e))?;
        info!("Flushed {} cache entries to {}", self.store.len(), self.file_path().display());
        Ok(())
    }

    /// Load a persisted snapshot, REPLACING the in-memory store
    /// wholesale. A missing snapshot is not an error: the cache stays
    /// a fresh, empty store.
    pub fn restore_from_file(&self) -> Result<()> {
        let path = self.file_path();
        if !path.exists() {
            debug!("No cache snapshot at {}, starting fresh", path.display());
            return Ok(());
        }

        let content = fs::read_to_string(&path).map_err(|e| self.io_error(e))?;
        let outer: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(|e| self.io_error(e))?;

        let mut restored: Vec<(PathBuf, SourceFileRecord)> = Vec::with_capacity(outer.len());
        for (key, value) in outer {
            let record = SourceFileRecord::from_json(&value).map_err(|e| self.io_error(e))?;
            restored.push((PathBuf::from(key), record));
        }

        self.store.clear();
        for (key, record) in restored {
            self.store.insert(key, record);
        }
        info!("Restored {} cache entries from {}", self.store.len(), path.display());
        Ok(())
    }

    fn io_error(&self, e: impl std::fmt::Display) -> AnalyzeError {
        AnalyzeError::CacheIo { path: self.file_path(), message: e.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(path: &str, uses_client: bool) -> SourceFileRecord {
        SourceFileRecord {
            file_path: PathBuf::from(path),
            file_name: Path::new(path)
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string(),
            dependencies: Vec::new(),
            uses_client_directive: uses_client,
            content_hash: "0".repeat(64),
            package_name: None,
        }
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SourceFileCache::new(temp_dir.path().join(".cache"));
        assert_eq!(cache.get(Path::new("/nope.ts")), None);
        assert!(!cache.has(Path::new("/nope.ts")));
    }

    #[test]
    fn test_set_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SourceFileCache::new(temp_dir.path().join(".cache"));
        let rec = record("/proj/a.ts", false);

        let stored = cache.set(rec.file_path.clone(), rec.clone());
        assert_eq!(stored, rec);
        assert!(cache.has(Path::new("/proj/a.ts")));
        assert_eq!(cache.get(Path::new("/proj/a.ts")), Some(rec));
    }

    #[test]
    fn test_set_overwrites_silently() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SourceFileCache::new(temp_dir.path().join(".cache"));
        cache.set(PathBuf::from("/proj/a.ts"), record("/proj/a.ts", false));
        cache.set(PathBuf::from("/proj/a.ts"), record("/proj/a.ts", true));

        assert_eq!(cache.len(), 1);
        assert!(cache.get(Path::new("/proj/a.ts")).unwrap().uses_client_directive);
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let a = SourceFileCache::new(temp_dir.path().join("a"));
        a.set(PathBuf::from("/proj/a.ts"), record("/proj/a.ts", false));
        a.set(PathBuf::from("/proj/b.ts"), record("/proj/b.ts", true));

        let b = SourceFileCache::new(temp_dir.path().join("b"));
        b.set(PathBuf::from("/proj/b.ts"), record("/proj/b.ts", true));
        b.set(PathBuf::from("/proj/a.ts"), record("/proj/a.ts", false));

        assert_eq!(a.serialize().unwrap(), b.serialize().unwrap());
    }

    #[test]
    fn test_serialized_values_are_record_strings() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SourceFileCache::new(temp_dir.path().join(".cache"));
        cache.set(PathBuf::from("/proj/a.ts"), record("/proj/a.ts", true));

        let outer: serde_json::Value =
            serde_json::from_str(&cache.serialize().unwrap()).unwrap();
        let value = outer.get("/proj/a.ts").unwrap();
        // Record-level serialization, not a nested object
        assert!(value.is_string());
        let inner: serde_json::Value = serde_json::from_str(value.as_str().unwrap()).unwrap();
        assert_eq!(inner.get("usesClientDirective"), Some(&serde_json::Value::Bool(true)));
    }

    #[test]
    fn test_write_restore_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join(".cache");

        let cache = SourceFileCache::new(&location);
        let a = record("/proj/a.ts", false);
        let b = record("/proj/b.ts", true);
        cache.set(a.file_path.clone(), a.clone());
        cache.set(b.file_path.clone(), b.clone());
        cache.write_to_file().unwrap();

        let restored = SourceFileCache::new(&location);
        restored.restore_from_file().unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(Path::new("/proj/a.ts")), Some(a));
        assert_eq!(restored.get(Path::new("/proj/b.ts")), Some(b));
    }

    #[test]
    fn test_restore_missing_file_leaves_cache_empty() {
        let temp_dir = TempDir::new().unwrap();
        let cache = SourceFileCache::new(temp_dir.path().join(".cache"));
        cache.restore_from_file().unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_restore_replaces_store_wholesale() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join(".cache");

        let writer = SourceFileCache::new(&location);
        writer.set(PathBuf::from("/proj/persisted.ts"), record("/proj/persisted.ts", false));
        writer.write_to_file().unwrap();

        let cache = SourceFileCache::new(&location);
        cache.set(PathBuf::from("/proj/stale.ts"), record("/proj/stale.ts", true));
        cache.restore_from_file().unwrap();

        // No merge: only the persisted entry survives
        assert_eq!(cache.len(), 1);
        assert!(cache.has(Path::new("/proj/persisted.ts")));
        assert!(!cache.has(Path::new("/proj/stale.ts")));
    }

    #[test]
    fn test_restore_corrupt_file_is_cache_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join(".cache");
        fs::create_dir_all(&location).unwrap();
        fs::write(location.join(CACHE_FILE_NAME), "not json").unwrap();

        let cache = SourceFileCache::new(&location);
        match cache.restore_from_file() {
            Err(AnalyzeError::CacheIo { .. }) => {}
            other => panic!("expected CacheIo, got {:?}", other),
        }
    }

    #[test]
    fn test_write_creates_cache_directory() {
        let temp_dir = TempDir::new().unwrap();
        let location = temp_dir.path().join("deeply/nested/.cache");
        let cache = SourceFileCache::new(&location);
        cache.set(PathBuf::from("/proj/a.ts"), record("/proj/a.ts", false));

        cache.write_to_file().unwrap();
        assert!(location.join(CACHE_FILE_NAME).is_file());
    }
}
