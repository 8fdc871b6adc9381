//! Local on-device cache port.

use crate::error::Result;

/// Durable key/value persistence on the client device.
///
/// Values are opaque strings (JSON blobs in practice); the cache carries no
/// logic beyond get/set/remove. Injected wherever client-side storage is
/// needed so tests can swap in an in-memory fake.
#[async_trait::async_trait]
pub trait LocalCache: Send + Sync {
    /// Reads the value stored under `key`, `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}
