//! Directory-backed LocalCache implementation.

use super::atomic_file::AtomicFile;
use crate::paths::AlexiPaths;
use alexi_core::cache::LocalCache;
use alexi_core::error::{AlexiError, Result};
use std::path::{Path, PathBuf};

/// LocalCache that stores one file per key.
///
/// Directory structure:
/// ```text
/// cache_dir/
/// ├── alexi-assistant-data.json
/// └── alexi-default-persona.json
/// ```
///
/// File operations are blocking, so each call runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct FileLocalCache {
    dir: PathBuf,
}

impl FileLocalCache {
    /// Creates a cache rooted at the platform cache directory.
    pub fn default_location() -> Result<Self> {
        let dir = AlexiPaths::cache_dir().map_err(|e| AlexiError::config(e.to_string()))?;
        Ok(Self::new(dir))
    }

    /// Creates a cache rooted at `dir` (created lazily on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry(&self, key: &str) -> Result<AtomicFile> {
        if key.is_empty() {
            return Err(AlexiError::validation("Cache key cannot be empty"));
        }
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Ok(AtomicFile::new(self.dir.join(format!("{}.json", file_name))))
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AlexiError::internal(format!("Cache task failed: {}", e)))?
}

#[async_trait::async_trait]
impl LocalCache for FileLocalCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = self.entry(key)?;
        run_blocking(move || entry.read()).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = self.entry(key)?;
        let value = value.to_string();
        run_blocking(move || entry.write(&value)).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let entry = self.entry(key)?;
        run_blocking(move || entry.remove()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileLocalCache::new(temp_dir.path());

        assert!(cache.get("alexi-default-persona").await.unwrap().is_none());

        cache.set("alexi-default-persona", "\"chef\"").await.unwrap();
        assert_eq!(
            cache.get("alexi-default-persona").await.unwrap().as_deref(),
            Some("\"chef\"")
        );

        cache.remove("alexi-default-persona").await.unwrap();
        assert!(cache.get("alexi-default-persona").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_survives_new_instance() {
        let temp_dir = TempDir::new().unwrap();
        FileLocalCache::new(temp_dir.path())
            .set("blob", "{}")
            .await
            .unwrap();

        let reopened = FileLocalCache::new(temp_dir.path());
        assert_eq!(reopened.get("blob").await.unwrap().as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_directory() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileLocalCache::new(temp_dir.path().join("cache"));

        cache.set("../outside", "x").await.unwrap();
        assert!(!temp_dir.path().join("outside.json").exists());
        assert_eq!(cache.get("../outside").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileLocalCache::new(temp_dir.path());
        assert!(cache.set("", "x").await.unwrap_err().is_validation());
    }
}
