//! Persona store traits.
//!
//! Defines the interface for the remote authoritative persona store.

use super::collection::PersonaCollection;
use crate::error::Result;

/// The remote, authoritative home of the persona collection.
///
/// Pure transport: implementations fetch and replace the whole collection and
/// carry no merge logic. The sync coordinator decides what wins.
///
/// # Implementation Notes
///
/// - `fetch` returns [`PersonaCollection::empty`] when nothing is stored yet,
///   not an error.
/// - `push` replaces the stored collection wholesale. A payload the store
///   rejects surfaces as `InvalidFormat`.
#[async_trait::async_trait]
pub trait RemotePersonaStore: Send + Sync {
    /// Retrieves the stored collection.
    async fn fetch(&self) -> Result<PersonaCollection>;

    /// Replaces the stored collection.
    async fn push(&self, collection: &PersonaCollection) -> Result<()>;
}
