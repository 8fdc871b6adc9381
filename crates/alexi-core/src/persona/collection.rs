//! The persisted persona collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::model::Persona;

/// The unit exchanged with the remote store and mirrored in the local cache.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonaCollection {
    #[serde(default)]
    pub personas: Vec<Persona>,
    #[serde(default)]
    pub default_persona_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl PersonaCollection {
    pub fn new(personas: Vec<Persona>, default_persona_id: Option<String>) -> Self {
        Self {
            personas,
            default_persona_id,
            updated_at: Utc::now(),
        }
    }

    /// The shape the remote store returns when nothing is stored.
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.personas.iter().any(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Persona> {
        self.personas.iter_mut().find(|p| p.id == id)
    }

    /// The default persona, or the first one when no default is recorded.
    pub fn default_persona(&self) -> Option<&Persona> {
        self.default_persona_id
            .as_deref()
            .and_then(|id| self.get(id))
            .or_else(|| self.personas.first())
    }

    /// Bumps the collection timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Drops personas whose id already appeared earlier in the list.
    ///
    /// Returns the ids that were removed.
    pub fn dedupe_ids(&mut self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        self.personas.retain(|p| {
            if seen.insert(p.id.clone()) {
                true
            } else {
                dropped.push(p.id.clone());
                false
            }
        });
        dropped
    }

    /// Resolves which persona is the default and rewrites every `is_default`
    /// flag to match it.
    ///
    /// Precedence: `preferred` if it names a persona in the set, then the
    /// collection's own `default_persona_id` if valid, then the first persona.
    /// Returns the resolved id, or `None` for an empty collection.
    pub fn resolve_default(&mut self, preferred: Option<&str>) -> Option<String> {
        let resolved = preferred
            .filter(|id| self.contains(id))
            .map(str::to_string)
            .or_else(|| {
                self.default_persona_id
                    .clone()
                    .filter(|id| self.contains(id))
            })
            .or_else(|| self.personas.first().map(|p| p.id.clone()));

        self.set_default_flags(resolved.as_deref());
        resolved
    }

    /// Marks exactly `id` as default (or nothing when `None`).
    pub fn set_default_flags(&mut self, id: Option<&str>) {
        for persona in &mut self.personas {
            persona.is_default = Some(persona.id.as_str()) == id;
        }
        self.default_persona_id = id.map(str::to_string);
    }

    /// Number of personas flagged as default.
    pub fn default_count(&self) -> usize {
        self.personas.iter().filter(|p| p.is_default).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::get_default_presets;

    fn presets() -> PersonaCollection {
        PersonaCollection::new(get_default_presets(), Some("shakespearean-poet".to_string()))
    }

    #[test]
    fn test_preferred_default_wins_when_present() {
        let mut collection = presets();
        let resolved = collection.resolve_default(Some("pirate-captain"));
        assert_eq!(resolved.as_deref(), Some("pirate-captain"));
        assert_eq!(collection.default_persona_id.as_deref(), Some("pirate-captain"));
        assert_eq!(collection.default_count(), 1);
        assert!(collection.get("pirate-captain").unwrap().is_default);
    }

    #[test]
    fn test_stale_preferred_falls_back_to_collection_default() {
        let mut collection = presets();
        let resolved = collection.resolve_default(Some("deleted-persona"));
        assert_eq!(resolved.as_deref(), Some("shakespearean-poet"));
        assert_eq!(collection.default_count(), 1);
    }

    #[test]
    fn test_falls_back_to_first_persona() {
        let mut collection = presets();
        collection.default_persona_id = Some("missing".to_string());
        let resolved = collection.resolve_default(None);
        assert_eq!(resolved.as_deref(), Some("helpful-assistant"));
        assert_eq!(collection.default_count(), 1);
    }

    #[test]
    fn test_resolve_rewrites_conflicting_flags() {
        let mut collection = presets();
        for persona in &mut collection.personas {
            persona.is_default = true;
        }
        collection.resolve_default(None);
        assert_eq!(collection.default_count(), 1);
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let mut collection = presets();
        let mut twin = collection.personas[0].clone();
        twin.name = "Twin".to_string();
        collection.personas.push(twin);

        let dropped = collection.dedupe_ids();
        assert_eq!(dropped, vec!["helpful-assistant".to_string()]);
        assert_eq!(collection.personas.len(), get_default_presets().len());
        assert_ne!(collection.get("helpful-assistant").unwrap().name, "Twin");
    }

    #[test]
    fn test_empty_collection_resolves_to_none() {
        let mut collection = PersonaCollection::empty();
        assert_eq!(collection.resolve_default(Some("x")), None);
        assert!(collection.default_persona().is_none());
    }

    #[test]
    fn test_wire_format_accepts_extra_fields() {
        let json = r#"{"personas":[],"defaultPersonaId":null,"chatSessions":[],"settings":{}}"#;
        let collection: PersonaCollection = serde_json::from_str(json).unwrap();
        assert!(collection.is_empty());
        assert!(collection.default_persona_id.is_none());
    }
}
