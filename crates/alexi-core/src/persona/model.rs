//! Persona domain model.
//!
//! A persona is a named system-prompt configuration that a conversation runs
//! under. Built-in personas ship with the application; custom personas are
//! created, duplicated or imported by the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use super::limits::MAX_NAME_CHARS;

/// Default accent color applied when a persona does not carry one.
pub const DEFAULT_COLOR: &str = "#3B82F6";

/// Default icon applied when a persona does not carry one.
pub const DEFAULT_ICON: &str = "🤖";

/// Suffix appended to the name of a duplicated persona.
const COPY_SUFFIX: &str = " (Copy)";

/// Organisational category of a persona.
///
/// Deserialization is case-insensitive and maps unknown strings to
/// [`PersonaCategory::Other`], the same as [`PersonaCategory::parse_lenient`].
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PersonaCategory {
    Professional,
    Creative,
    Educational,
    Entertainment,
    Personal,
    Technical,
    Other,
}

impl Default for PersonaCategory {
    fn default() -> Self {
        PersonaCategory::Other
    }
}

impl PersonaCategory {
    /// Parses a category leniently, falling back to `Other`.
    pub fn parse_lenient(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for PersonaCategory {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&value))
    }
}

/// A persona as held in memory and persisted in both stores.
///
/// The wire format is camelCase JSON (`isDefault`, `createdAt`, ...) so the
/// same blob can be exchanged with the remote store and share links.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Unique identifier, immutable after creation
    pub id: String,
    /// Display name of the persona
    pub name: String,
    /// System instruction text sent ahead of every conversation
    pub prompt: String,
    /// Short human-readable summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: PersonaCategory,
    /// Accent color for UI theming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Visual icon/emoji
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Whether this persona is the default one
    #[serde(default)]
    pub is_default: bool,
    /// Whether this persona was created by the user (and may be deleted)
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Persona {
    /// Generates a fresh persona identifier.
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Whether the user may delete this persona (ignoring the default guard).
    pub fn is_deletable(&self) -> bool {
        self.is_custom
    }

    /// Creates a custom, non-default copy of this persona with a fresh id.
    pub fn duplicate(&self) -> Persona {
        let now = Utc::now();
        Persona {
            id: Self::new_id(),
            name: copy_name(&self.name),
            is_default: false,
            is_custom: true,
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }
}

/// Appends the copy suffix, trimming the base name so the result stays
/// within the name limit.
fn copy_name(name: &str) -> String {
    let budget = MAX_NAME_CHARS - COPY_SUFFIX.chars().count();
    let base: String = name.chars().take(budget).collect();
    format!("{}{}", base.trim_end(), COPY_SUFFIX)
}
