//! Atomic file operations for cache entries.
//!
//! Writes go to a sibling temp file that is fsynced and renamed over the
//! target, under an exclusive lock file, so readers never see a torn blob.

use alexi_core::error::{AlexiError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};

/// A handle to a single file written atomically.
///
/// Provides:
/// - **Atomicity**: updates are all-or-nothing via tmp file + rename
/// - **Isolation**: a lock file serialises writers across processes
/// - **Durability**: explicit fsync before rename
#[derive(Debug, Clone)]
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file contents.
    ///
    /// Takes no lock: writers only ever rename a complete file into place.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: file exists
    /// - `Ok(None)`: file doesn't exist
    /// - `Err`: failed to read the file
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file contents atomically.
    pub fn write(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let _lock = FileLock::acquire(&self.path)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| AlexiError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| AlexiError::io("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
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
                .map_err(|e| AlexiError::data_access(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock happens when the handle closes; the lock file itself is best effort
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("entry.json"));

        file.write("{\"a\":1}").unwrap();
        assert_eq!(file.read().unwrap().as_deref(), Some("{\"a\":1}"));

        file.write("{\"a\":2}").unwrap();
        assert_eq!(file.read().unwrap().as_deref(), Some("{\"a\":2}"));
    }

    #[test]
    fn test_read_does_not_wait_for_writer_lock() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("entry.json"));
        file.write("settled").unwrap();

        let _held = FileLock::acquire(file.path()).unwrap();
        assert_eq!(file.read().unwrap().as_deref(), Some("settled"));
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("missing.json"));
        assert!(file.read().unwrap().is_none());
    }

    #[test]
    fn test_no_temp_or_lock_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entry.json");
        let file = AtomicFile::new(path.clone());

        file.write("value").unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join(".entry.json.tmp").exists());
        assert!(!temp_dir.path().join("entry.lock").exists());
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("nested/dir/entry.json"));
        file.write("value").unwrap();
        assert!(file.path().exists());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::new(temp_dir.path().join("entry.json"));
        file.write("value").unwrap();
        file.remove().unwrap();
        file.remove().unwrap();
        assert!(file.read().unwrap().is_none());
    }
}
