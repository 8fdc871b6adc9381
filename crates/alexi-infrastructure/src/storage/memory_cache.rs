//! In-memory LocalCache implementation.

use alexi_core::cache::LocalCache;
use alexi_core::error::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A process-local cache, used for tests and for ephemeral sessions.
///
/// Clones share the same storage, which lets a test hand one clone to the
/// code under test and inspect another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLocalCache {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl LocalCache for InMemoryLocalCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}
