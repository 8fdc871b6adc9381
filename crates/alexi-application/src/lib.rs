//! Application layer for Alexi.
//!
//! Coordinates the domain ports and infrastructure adapters into the two
//! use cases the front-ends drive: persona management with sync, and chat.

pub mod chat_service;
pub mod persona_sync;

pub use chat_service::ChatService;
pub use persona_sync::{ImportReport, PersonaSyncCoordinator, SyncEvent, TierKind};
