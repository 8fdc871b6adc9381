//! Persona domain module.
//!
//! This module contains all persona-related domain models, the remote store
//! interface, validation limits, import sanitation and preset configurations.
//!
//! # Module Structure
//!
//! - `model`: Core persona domain models (`Persona`, `PersonaCategory`)
//! - `collection`: The persisted `PersonaCollection` and default resolution
//! - `repository`: Remote store trait
//! - `request`: Create/update request models
//! - `import`: Sanitation of foreign records and the export bundle
//! - `limits`: Field and collection limits
//! - `preset`: Built-in seed personas
//!
//! # Usage
//!
//! ```ignore
//! use alexi_core::persona::{Persona, PersonaCollection, RemotePersonaStore, get_default_presets};
//! ```

mod collection;
mod import;
pub mod limits;
mod model;
mod preset;
mod repository;
pub mod request;

// Re-export public API
pub use collection::PersonaCollection;
pub use import::{BUNDLE_VERSION, ExportBundle, parse_bundle_records, sanitize_record};
pub use model::{DEFAULT_COLOR, DEFAULT_ICON, Persona, PersonaCategory};
pub use preset::{SEED_DEFAULT_PERSONA_ID, get_default_presets};
pub use repository::RemotePersonaStore;
pub use request::{CreatePersonaRequest, UpdatePersonaRequest};
