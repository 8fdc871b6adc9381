//! Stores the coordinator reconciles, plus its side channel.

use alexi_core::cache::LocalCache;
use alexi_core::error::Result;
use alexi_core::persona::{PersonaCollection, RemotePersonaStore};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::task::TaskTracker;

/// LocalCache key of the full collection blob.
pub const COLLECTION_KEY: &str = "alexi-assistant-data";

/// LocalCache key of the preferred default persona id.
pub const PREFERRED_DEFAULT_KEY: &str = "alexi-default-persona";

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    Remote,
    Cache,
    BuiltIn,
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TierKind::Remote => "remote",
            TierKind::Cache => "cache",
            TierKind::BuiltIn => "built-in",
        };
        f.write_str(name)
    }
}

/// Side-channel notifications about persistence.
///
/// Remote and cache write failures never fail a mutation; this is where
/// they become observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Loaded { tier: TierKind },
    RemotePushSucceeded,
    RemotePushFailed { reason: String },
    CacheWriteFailed { reason: String },
}

#[derive(Clone, Default)]
pub(crate) struct SyncEvents(Option<UnboundedSender<SyncEvent>>);

impl SyncEvents {
    pub(crate) fn new(sender: UnboundedSender<SyncEvent>) -> Self {
        Self(Some(sender))
    }

    pub(crate) fn emit(&self, event: SyncEvent) {
        if let Some(sender) = &self.0 {
            let _ = sender.send(event);
        }
    }
}

/// Typed access to the two LocalCache entries.
pub(crate) struct CollectionCache {
    cache: Arc<dyn LocalCache>,
}

impl CollectionCache {
    pub(crate) fn new(cache: Arc<dyn LocalCache>) -> Self {
        Self { cache }
    }

    pub(crate) async fn read(&self) -> Result<Option<PersonaCollection>> {
        match self.cache.get(COLLECTION_KEY).await? {
            Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn write(&self, collection: &PersonaCollection) -> Result<()> {
        let blob = serde_json::to_string(collection)?;
        self.cache.set(COLLECTION_KEY, &blob).await
    }

    /// The preferred default id, if one was recorded and is readable.
    pub(crate) async fn preferred_default(&self) -> Option<String> {
        let raw = match self.cache.get(PREFERRED_DEFAULT_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("[PersonaSync] Failed to read preferred default: {}", e);
                return None;
            }
        };
        // Stored as a JSON string; tolerate a bare id too.
        let id = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        let id = id.trim();
        (!id.is_empty()).then(|| id.to_string())
    }

    pub(crate) async fn set_preferred_default(&self, id: &str) -> Result<()> {
        let blob = serde_json::to_string(id)?;
        self.cache.set(PREFERRED_DEFAULT_KEY, &blob).await
    }
}

/// Everything a load tier or a mutation needs to reach the stores.
pub(crate) struct SyncContext {
    pub(crate) cache: CollectionCache,
    remote: Arc<dyn RemotePersonaStore>,
    pushes: TaskTracker,
    pub(crate) events: SyncEvents,
}

impl SyncContext {
    pub(crate) fn new(cache: Arc<dyn LocalCache>, remote: Arc<dyn RemotePersonaStore>) -> Self {
        Self {
            cache: CollectionCache::new(cache),
            remote,
            pushes: TaskTracker::new(),
            events: SyncEvents::default(),
        }
    }

    pub(crate) async fn fetch_remote(&self) -> Result<PersonaCollection> {
        self.remote.fetch().await
    }

    /// Writes the collection to LocalCache. A failure is logged and published,
    /// never returned.
    pub(crate) async fn write_cache(&self, collection: &PersonaCollection) {
        if let Err(e) = self.cache.write(collection).await {
            tracing::warn!("[PersonaSync] LocalCache write failed: {}", e);
            self.events.emit(SyncEvent::CacheWriteFailed {
                reason: e.to_string(),
            });
        }
    }

    /// Pushes the collection to the remote store without waiting for it.
    pub(crate) fn push_in_background(&self, collection: PersonaCollection) {
        let remote = Arc::clone(&self.remote);
        let events = self.events.clone();
        self.pushes.spawn(async move {
            match remote.push(&collection).await {
                Ok(()) => {
                    tracing::debug!(
                        "[PersonaSync] Remote push of {} personas succeeded",
                        collection.personas.len()
                    );
                    events.emit(SyncEvent::RemotePushSucceeded);
                }
                Err(e) => {
                    tracing::warn!("[PersonaSync] Remote push failed: {}", e);
                    events.emit(SyncEvent::RemotePushFailed {
                        reason: e.to_string(),
                    });
                }
            }
        });
    }

    /// Waits for every push spawned so far.
    pub(crate) async fn flush(&self) {
        self.pushes.close();
        self.pushes.wait().await;
        self.pushes.reopen();
    }
}
