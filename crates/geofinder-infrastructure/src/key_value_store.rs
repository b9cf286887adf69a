//! File-backed implementation of the device-local key/value store.
//!
//! One file per key (`<dir>/<key>.value`), each written atomically. Writes
//! take the key's file lock, so they serialize across threads and processes.

use crate::storage::AtomicTextFile;
use geofinder_core::error::{GeoError, Result};
use geofinder_core::store::LocalStore;
use std::path::{Path, PathBuf};

pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> Result<AtomicTextFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(GeoError::storage(format!("Invalid store key: {:?}", key)));
        }
        Ok(AtomicTextFile::new(self.dir.join(format!("{}.value", key))))
    }
}

impl LocalStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.file_for(key)?.load()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!(key, "[Store] set");
        self.file_for(key)?
            .update(|_| Ok(Some(value.to_string())))
    }

    fn remove(&self, key: &str) -> Result<()> {
        tracing::debug!(key, "[Store] remove");
        self.file_for(key)?.remove()
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<Option<String>>,
    ) -> Result<()> {
        tracing::debug!(key, "[Store] update");
        self.file_for(key)?.update(|current| f(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().to_path_buf());

        assert_eq!(store.get("highScore").unwrap(), None);
        store.set("highScore", "17").unwrap();
        assert_eq!(store.get("highScore").unwrap().as_deref(), Some("17"));
        assert!(temp_dir.path().join("highScore.value").exists());

        store.remove("highScore").unwrap();
        assert_eq!(store.get("highScore").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        FileKeyValueStore::new(temp_dir.path().to_path_buf())
            .set("lastUsedImages", "[1,2]")
            .unwrap();

        let reopened = FileKeyValueStore::new(temp_dir.path().to_path_buf());
        assert_eq!(
            reopened.get("lastUsedImages").unwrap().as_deref(),
            Some("[1,2]")
        );
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path().to_path_buf());
        for key in ["", "../escape", "a/b", "dot.key"] {
            assert!(store.set(key, "x").is_err(), "{key} should be rejected");
        }
    }

    #[test]
    fn test_update_is_exclusive_across_threads() {
        let temp_dir = TempDir::new().unwrap();
        let store = std::sync::Arc::new(FileKeyValueStore::new(temp_dir.path().to_path_buf()));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        store
                            .update("plays", &mut |current| {
                                let n: i64 = current.map_or(0, |c| c.parse().unwrap());
                                Ok(Some((n + 1).to_string()))
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(store.get("plays").unwrap().as_deref(), Some("80"));
    }
}
