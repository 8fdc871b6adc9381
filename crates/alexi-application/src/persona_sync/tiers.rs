//! Ordered load tiers.
//!
//! `load` walks the tiers in order and takes the first non-empty collection.
//! The winning tier then converges the stores it did not come from.

use super::context::{SyncContext, TierKind};
use alexi_core::error::Result;
use alexi_core::persona::{PersonaCollection, SEED_DEFAULT_PERSONA_ID, get_default_presets};

#[async_trait::async_trait]
pub(crate) trait CollectionTier: Send + Sync {
    fn kind(&self) -> TierKind;

    /// The tier's collection, `None` when it has nothing to offer.
    async fn fetch(&self, ctx: &SyncContext) -> Result<Option<PersonaCollection>>;

    /// Brings the other stores in line after this tier won.
    async fn converge(&self, ctx: &SyncContext, collection: &PersonaCollection);
}

/// The default tier order: remote, cache, built-in seed.
pub(crate) fn default_tiers() -> Vec<Box<dyn CollectionTier>> {
    vec![Box::new(RemoteTier), Box::new(CacheTier), Box::new(BuiltInTier)]
}

/// The built-in seed list with its default resolved.
pub(crate) fn seed_collection() -> PersonaCollection {
    let mut collection = PersonaCollection::new(
        get_default_presets(),
        Some(SEED_DEFAULT_PERSONA_ID.to_string()),
    );
    collection.resolve_default(None);
    collection
}

struct RemoteTier;

#[async_trait::async_trait]
impl CollectionTier for RemoteTier {
    fn kind(&self) -> TierKind {
        TierKind::Remote
    }

    async fn fetch(&self, ctx: &SyncContext) -> Result<Option<PersonaCollection>> {
        let collection = ctx.fetch_remote().await?;
        Ok((!collection.is_empty()).then_some(collection))
    }

    async fn converge(&self, ctx: &SyncContext, collection: &PersonaCollection) {
        ctx.write_cache(collection).await;
    }
}

struct CacheTier;

#[async_trait::async_trait]
impl CollectionTier for CacheTier {
    fn kind(&self) -> TierKind {
        TierKind::Cache
    }

    async fn fetch(&self, ctx: &SyncContext) -> Result<Option<PersonaCollection>> {
        Ok(ctx.cache.read().await?.filter(|c| !c.is_empty()))
    }

    async fn converge(&self, ctx: &SyncContext, collection: &PersonaCollection) {
        ctx.push_in_background(collection.clone());
    }
}

struct BuiltInTier;

#[async_trait::async_trait]
impl CollectionTier for BuiltInTier {
    fn kind(&self) -> TierKind {
        TierKind::BuiltIn
    }

    async fn fetch(&self, _ctx: &SyncContext) -> Result<Option<PersonaCollection>> {
        Ok(Some(seed_collection()))
    }

    async fn converge(&self, ctx: &SyncContext, collection: &PersonaCollection) {
        ctx.write_cache(collection).await;
        ctx.push_in_background(collection.clone());
    }
}
