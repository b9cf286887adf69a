//! Atomic text file operations.
//!
//! Writes go to a hidden temporary file in the same directory, are synced,
//! then renamed over the target. Read-modify-write cycles and removals hold an
//! exclusive lock on a sibling `.lock` file, which is left in place so every
//! process contends on the same inode.

use geofinder_core::error::{GeoError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// A handle to one file updated with tmp file + rename.
pub struct AtomicTextFile {
    path: PathBuf,
}

impl AtomicTextFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: File exists and is not blank
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read the file
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(content))
    }

    /// Writes `content` atomically.
    pub fn save(&self, content: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;

        // Ensure data is written to disk
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Deletes the file under the lock. Missing files are not an error.
    pub fn remove(&self) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads, transforms and saves the content under an exclusive lock.
    ///
    /// `f` receives the current content (`None` when missing) and returns the
    /// new content, or `None` to leave the file untouched.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Result<Option<String>>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let current = self.load()?;
        if let Some(next) = f(current)? {
            self.save(&next)?;
        }

        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| GeoError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| GeoError::io("Path has no file name"))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// Holds an exclusive lock until dropped. Closing the handle unlocks.
struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| GeoError::storage(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTextFile::new(temp_dir.path().join("highScore"));

        file.save("12").unwrap();

        assert_eq!(file.load().unwrap().as_deref(), Some("12"));
    }

    #[test]
    fn test_load_nonexistent_or_blank_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTextFile::new(temp_dir.path().join("missing"));
        assert!(file.load().unwrap().is_none());

        file.save("  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_creates_and_modifies() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTextFile::new(temp_dir.path().join("counter"));

        file.update(|current| {
            assert!(current.is_none());
            Ok(Some("1".to_string()))
        })
        .unwrap();
        file.update(|current| {
            let n: i64 = current.unwrap().parse().unwrap();
            Ok(Some((n + 1).to_string()))
        })
        .unwrap();

        assert_eq!(file.load().unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.value");

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let file = AtomicTextFile::new(path);
                    for _ in 0..25 {
                        file.update(|current| {
                            let n: i64 = current.map_or(0, |c| c.trim().parse().unwrap());
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

        let file = AtomicTextFile::new(path);
        assert_eq!(file.load().unwrap().as_deref(), Some("200"));
        // The lock file stays behind so later lockers share its inode
        assert!(temp_dir.path().join("counter.lock").exists());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("value");
        let file = AtomicTextFile::new(path.clone());

        file.save("[1,2]").unwrap();

        assert!(!temp_dir.path().join("nested").join(".value.tmp").exists());
        assert!(path.exists());
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTextFile::new(temp_dir.path().join("gone"));
        file.remove().unwrap();
        file.save("x").unwrap();
        file.remove().unwrap();
        assert!(file.load().unwrap().is_none());
    }
}
