//! Durable key/value persistence.
//!
//! The arcade only needs string values under a handful of keys, the same shape
//! as browser `localStorage`. Hosts pick a backend: [`MemoryStore`] for tests
//! and throwaway sessions, [`JsonFileStore`] for a native host.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;

use crate::error::StorageError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys in one JSON object file.
///
/// Every `set` rewrites the whole file through a sibling temp file and a
/// rename, so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HashMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let raw = serde_json::to_vec_pretty(&self.values)?;
        {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(&raw)?;
            f.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            // Keep the cache in step with what is on disk.
            match previous {
                Some(v) => self.values.insert(key.to_string(), v),
                None => self.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir()
            .join(format!("arcade-storage-{}-{}", std::process::id(), nanos))
            .join(name)
    }

    #[test]
    fn memory_store_overwrites() {
        let mut s = MemoryStore::new();
        assert_eq!(s.get("k").unwrap(), None);
        s.set("k", "1").unwrap();
        s.set("k", "2").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = scratch_path("progress.json");
        {
            let mut s = JsonFileStore::open(&path).unwrap();
            s.set("discoveredGames", r#"["snake"]"#).unwrap();
        }
        let s = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            s.get("discoveredGames").unwrap().as_deref(),
            Some(r#"["snake"]"#)
        );
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn file_store_rejects_garbage() {
        let path = scratch_path("broken.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StorageError::Format(_))
        ));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
