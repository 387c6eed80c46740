//! Key-value blob storage: the server-side stand-in for browser local storage.
//!
//! `FileStore` keeps one file per key under a data directory and replaces it atomically
//! (write to a temp file, then rename). `MemoryStore` is the in-process variant used in tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("storage I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("storage JSON error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("storage unavailable: {0}")]
  Unavailable(String),
}

/// Read/write a string blob under a key. Writes replace the previous value entirely.
pub trait KvStore: Send + Sync {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
  fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  /// Creates the directory if needed. Fails when it cannot be created.
  pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
    let dir = dir.as_ref().to_path_buf();
    fs::create_dir_all(&dir)?;
    Ok(Self { dir })
  }

  fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
    let valid = !key.is_empty()
      && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
      && !key.starts_with('.');
    if !valid {
      return Err(StoreError::Unavailable(format!("invalid storage key {key:?}")));
    }
    Ok(self.dir.join(format!("{key}.json")))
  }
}

impl KvStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let path = self.path_for(key)?;
    match fs::read_to_string(&path) {
      Ok(s) => Ok(Some(s)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let path = self.path_for(key)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, value)?;
    fs::rename(&tmp, &path)?;
    Ok(())
  }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  blobs: Mutex<HashMap<String, String>>,
}

impl KvStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let blobs = self
      .blobs
      .lock()
      .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
    Ok(blobs.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let mut blobs = self
      .blobs
      .lock()
      .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
    blobs.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_store_round_trip_and_replace() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("nested")).unwrap();
    assert_eq!(store.get("queue").unwrap(), None);
    store.set("queue", "[1]").unwrap();
    store.set("queue", "[1,2]").unwrap();
    assert_eq!(store.get("queue").unwrap().as_deref(), Some("[1,2]"));
  }

  #[test]
  fn file_store_rejects_path_like_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    assert!(store.set("../escape", "x").is_err());
    assert!(store.get("").is_err());
  }

  #[test]
  fn memory_store_round_trip() {
    let store = MemoryStore::default();
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    assert_eq!(store.get("missing").unwrap(), None);
  }
}
