//! Persona Sync Coordinator
//!
//! Reconciles the remote persona store, the on-device cache and the built-in
//! seed list into one in-memory [`PersonaCollection`], and applies every
//! persona mutation against it.
//!
//! # Persistence
//!
//! - LocalCache is written before a mutation returns, so a reload right after
//!   it (even offline) sees the change.
//! - The remote store is written in the background. A failed push is logged
//!   and published as a [`SyncEvent`]; it never fails or rolls back the
//!   mutation.
//!
//! # Default persona
//!
//! Exactly one persona is flagged default once `load` has run. `set_default`
//! also records the choice in a separate cache entry, which takes precedence
//! over the collection's own `defaultPersonaId` on the next load as long as
//! the persona still exists.

mod context;
mod tiers;

pub use context::{COLLECTION_KEY, PREFERRED_DEFAULT_KEY, SyncEvent, TierKind};

use alexi_core::cache::LocalCache;
use alexi_core::error::{AlexiError, Result};
use alexi_core::persona::limits::MAX_COLLECTION_SIZE;
use alexi_core::persona::{
    CreatePersonaRequest, ExportBundle, Persona, PersonaCollection, RemotePersonaStore,
    UpdatePersonaRequest, parse_bundle_records, sanitize_record,
};
use alexi_infrastructure::LinkResolver;
use context::{SyncContext, SyncEvents};
use serde_json::Value;
use std::sync::Arc;
use tiers::{CollectionTier, default_tiers, seed_collection};
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;

const ENTITY: &str = "persona";

/// Outcome of a batch import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub imported: Vec<Persona>,
    pub skipped: usize,
}

pub struct PersonaSyncCoordinator {
    state: RwLock<PersonaCollection>,
    ctx: SyncContext,
    tiers: Vec<Box<dyn CollectionTier>>,
}

impl PersonaSyncCoordinator {
    /// Creates a coordinator holding the seed list until [`Self::load`] runs.
    pub fn new(cache: Arc<dyn LocalCache>, remote: Arc<dyn RemotePersonaStore>) -> Self {
        Self {
            state: RwLock::new(seed_collection()),
            ctx: SyncContext::new(cache, remote),
            tiers: default_tiers(),
        }
    }

    /// Publishes [`SyncEvent`]s to `sender`.
    pub fn with_event_sender(mut self, sender: UnboundedSender<SyncEvent>) -> Self {
        self.ctx.events = SyncEvents::new(sender);
        self
    }

    /// Resolves the session collection from the first tier that has one.
    ///
    /// Never fails: a tier error falls through to the next tier and the
    /// built-in seed list is always available.
    pub async fn load(&self) -> PersonaCollection {
        let preferred = self.ctx.cache.preferred_default().await;

        for tier in &self.tiers {
            let mut collection = match tier.fetch(&self.ctx).await {
                Ok(Some(collection)) if !collection.is_empty() => collection,
                Ok(_) => {
                    tracing::debug!("[PersonaSync] Tier {} is empty", tier.kind());
                    continue;
                }
                Err(e) => {
                    tracing::warn!("[PersonaSync] Tier {} unavailable: {}", tier.kind(), e);
                    continue;
                }
            };

            let dropped = collection.dedupe_ids();
            if !dropped.is_empty() {
                tracing::warn!(
                    "[PersonaSync] Tier {} had duplicate persona ids, kept first of {:?}",
                    tier.kind(),
                    dropped
                );
            }
            collection.resolve_default(preferred.as_deref());
            tier.converge(&self.ctx, &collection).await;

            tracing::info!(
                "[PersonaSync] Loaded {} personas from {} tier (default: {:?})",
                collection.personas.len(),
                tier.kind(),
                collection.default_persona_id
            );
            self.ctx.events.emit(SyncEvent::Loaded { tier: tier.kind() });
            *self.state.write().await = collection.clone();
            return collection;
        }

        tracing::error!("[PersonaSync] No tier produced a collection, using seed list");
        let mut collection = seed_collection();
        collection.resolve_default(preferred.as_deref());
        *self.state.write().await = collection.clone();
        collection
    }

    /// Applies `op` to a copy of the collection and commits it.
    ///
    /// Nothing changes when `op` fails. On success the copy is written to
    /// LocalCache, replaces the in-memory state and is pushed in the background.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut PersonaCollection) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let value = op(&mut next)?;
        next.touch();

        self.ctx.write_cache(&next).await;
        *state = next.clone();
        drop(state);

        self.ctx.push_in_background(next);
        Ok(value)
    }

    pub async fn create(&self, request: CreatePersonaRequest) -> Result<Persona> {
        request.validate()?;
        let persona = request.into_persona();

        let created = self
            .mutate(|collection| {
                ensure_capacity(collection)?;
                collection.personas.push(persona.clone());
                Ok(persona)
            })
            .await?;

        tracing::info!("[PersonaSync] Created persona {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update(&self, id: &str, request: UpdatePersonaRequest) -> Result<Persona> {
        self.mutate(|collection| {
            let persona = collection
                .get_mut(id)
                .ok_or_else(|| AlexiError::not_found(ENTITY, id))?;
            request.apply_to(persona)?;
            Ok(persona.clone())
        })
        .await
    }

    /// Removes a custom, non-default persona.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.mutate(|collection| {
            let persona = collection
                .get(id)
                .ok_or_else(|| AlexiError::not_found(ENTITY, id))?;
            if persona.is_default || collection.default_persona_id.as_deref() == Some(id) {
                return Err(AlexiError::invariant(format!(
                    "Persona '{}' is the default persona; set another default before deleting it",
                    persona.name
                )));
            }
            if !persona.is_deletable() {
                return Err(AlexiError::invariant(format!(
                    "Persona '{}' is built in and cannot be deleted",
                    persona.name
                )));
            }
            collection.personas.retain(|p| p.id != id);
            Ok(())
        })
        .await?;

        tracing::info!("[PersonaSync] Deleted persona {}", id);
        Ok(())
    }

    /// Makes `id` the only default persona and records it as preferred.
    pub async fn set_default(&self, id: &str) -> Result<Persona> {
        let persona = self
            .mutate(|collection| {
                if !collection.contains(id) {
                    return Err(AlexiError::not_found(ENTITY, id));
                }
                collection.set_default_flags(Some(id));
                collection
                    .get(id)
                    .cloned()
                    .ok_or_else(|| AlexiError::not_found(ENTITY, id))
            })
            .await?;

        if let Err(e) = self.ctx.cache.set_preferred_default(id).await {
            tracing::warn!("[PersonaSync] Failed to record preferred default: {}", e);
            self.ctx.events.emit(SyncEvent::CacheWriteFailed {
                reason: e.to_string(),
            });
        }

        tracing::info!("[PersonaSync] Default persona is now {}", id);
        Ok(persona)
    }

    pub async fn duplicate(&self, id: &str) -> Result<Persona> {
        self.mutate(|collection| {
            let copy = collection
                .get(id)
                .ok_or_else(|| AlexiError::not_found(ENTITY, id))?
                .duplicate();
            ensure_capacity(collection)?;
            collection.personas.push(copy.clone());
            Ok(copy)
        })
        .await
    }

    /// Imports persona-like records, skipping the invalid ones.
    ///
    /// Foreign ids and flags are discarded; every accepted record gets a fresh
    /// id and becomes a custom, non-default persona.
    pub async fn import_many(&self, records: &[Value]) -> ImportReport {
        let mut report = ImportReport::default();

        for record in records {
            let Some(request) = sanitize_record(record) else {
                report.skipped += 1;
                continue;
            };
            match self.create(request).await {
                Ok(persona) => report.imported.push(persona),
                Err(e) => {
                    tracing::warn!("[PersonaSync] Skipping imported record: {}", e);
                    report.skipped += 1;
                }
            }
        }

        tracing::info!(
            "[PersonaSync] Imported {} personas, skipped {}",
            report.imported.len(),
            report.skipped
        );
        report
    }

    /// Imports a pasted export bundle.
    pub async fn import_bundle(&self, json: &str) -> Result<ImportReport> {
        let records = parse_bundle_records(json)?;
        require_imports(self.import_many(&records).await)
    }

    /// Resolves a share link and imports the personas behind it.
    pub async fn import_from_link(&self, resolver: &LinkResolver, url: &str) -> Result<ImportReport> {
        let records = resolver.resolve(url).await?;
        require_imports(self.import_many(&records).await)
    }

    /// Uploads the current collection and returns an import link.
    pub async fn share_link(&self, resolver: &LinkResolver) -> Option<String> {
        let personas = self.personas().await;
        resolver.create_shareable_link(&personas).await
    }

    /// The custom personas in the file export format.
    pub async fn export_bundle(&self) -> ExportBundle {
        ExportBundle::from_personas(&self.state.read().await.personas)
    }

    pub async fn get(&self, id: &str) -> Option<Persona> {
        self.state.read().await.get(id).cloned()
    }

    pub async fn personas(&self) -> Vec<Persona> {
        self.state.read().await.personas.clone()
    }

    pub async fn default_persona(&self) -> Option<Persona> {
        self.state.read().await.default_persona().cloned()
    }

    pub async fn snapshot(&self) -> PersonaCollection {
        self.state.read().await.clone()
    }

    /// Waits for all background remote pushes issued so far.
    pub async fn flush_remote(&self) {
        self.ctx.flush().await;
    }
}

fn ensure_capacity(collection: &PersonaCollection) -> Result<()> {
    if collection.personas.len() >= MAX_COLLECTION_SIZE {
        return Err(AlexiError::validation(format!(
            "A collection holds at most {} personas",
            MAX_COLLECTION_SIZE
        )));
    }
    Ok(())
}

fn require_imports(report: ImportReport) -> Result<ImportReport> {
    if report.imported.is_empty() {
        return Err(AlexiError::invalid_format(
            "No valid persona found (each entry needs a non-empty name and prompt)",
        ));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alexi_core::persona::SEED_DEFAULT_PERSONA_ID;
    use alexi_infrastructure::InMemoryLocalCache;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingRemote {
        pushed: Mutex<Vec<PersonaCollection>>,
    }

    #[async_trait::async_trait]
    impl RemotePersonaStore for RecordingRemote {
        async fn fetch(&self) -> Result<PersonaCollection> {
            Ok(PersonaCollection::empty())
        }

        async fn push(&self, collection: &PersonaCollection) -> Result<()> {
            self.pushed.lock().await.push(collection.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_seed_load_writes_cache_and_remote() {
        let cache = InMemoryLocalCache::new();
        let remote = Arc::new(RecordingRemote::default());
        let coordinator = PersonaSyncCoordinator::new(Arc::new(cache.clone()), remote.clone());

        let collection = coordinator.load().await;
        coordinator.flush_remote().await;

        assert_eq!(collection.default_persona_id.as_deref(), Some(SEED_DEFAULT_PERSONA_ID));
        assert_eq!(collection.default_count(), 1);
        assert!(cache.get(COLLECTION_KEY).await.unwrap().is_some());
        assert!(cache.get(PREFERRED_DEFAULT_KEY).await.unwrap().is_none());
        assert_eq!(remote.pushed.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_operation_leaves_state_untouched() {
        let coordinator = PersonaSyncCoordinator::new(
            Arc::new(InMemoryLocalCache::new()),
            Arc::new(RecordingRemote::default()),
        );
        coordinator.load().await;
        let before = coordinator.snapshot().await;

        let request = UpdatePersonaRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(coordinator.update("pirate-captain", request).await.unwrap_err().is_validation());
        assert_eq!(coordinator.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_builtin_persona_cannot_be_deleted() {
        let coordinator = PersonaSyncCoordinator::new(
            Arc::new(InMemoryLocalCache::new()),
            Arc::new(RecordingRemote::default()),
        );
        coordinator.load().await;

        let err = coordinator.delete("pirate-captain").await.unwrap_err();
        assert!(err.is_invariant_violation());
        assert!(coordinator.get("pirate-captain").await.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_is_custom_copy() {
        let coordinator = PersonaSyncCoordinator::new(
            Arc::new(InMemoryLocalCache::new()),
            Arc::new(RecordingRemote::default()),
        );
        coordinator.load().await;

        let copy = coordinator.duplicate(SEED_DEFAULT_PERSONA_ID).await.unwrap();
        assert_ne!(copy.id, SEED_DEFAULT_PERSONA_ID);
        assert!(copy.is_custom);
        assert!(!copy.is_default);
        assert!(copy.name.ends_with(" (Copy)"));
        assert_eq!(coordinator.snapshot().await.default_count(), 1);

        // A duplicated built-in is custom, so it can be deleted again.
        coordinator.delete(&copy.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_export_bundle_contains_custom_only() {
        let coordinator = PersonaSyncCoordinator::new(
            Arc::new(InMemoryLocalCache::new()),
            Arc::new(RecordingRemote::default()),
        );
        coordinator.load().await;
        coordinator
            .create(CreatePersonaRequest::new("Mine", "Prompt"))
            .await
            .unwrap();

        let bundle = coordinator.export_bundle().await;
        assert_eq!(bundle.personas.len(), 1);
        assert_eq!(bundle.personas[0].name, "Mine");

        let json = serde_json::to_string(&bundle).unwrap();
        let report = coordinator.import_bundle(&json).await.unwrap();
        assert_eq!(report.imported.len(), 1);
        assert_ne!(report.imported[0].id, bundle.personas[0].id);
    }

    #[tokio::test]
    async fn test_bundle_without_valid_entries_is_invalid_format() {
        let coordinator = PersonaSyncCoordinator::new(
            Arc::new(InMemoryLocalCache::new()),
            Arc::new(RecordingRemote::default()),
        );
        coordinator.load().await;

        let err = coordinator
            .import_bundle(r#"{"personas":[{"name":"no prompt"}]}"#)
            .await
            .unwrap_err();
        assert!(err.is_invalid_format());
    }
}
