//! Persona creation and update request models.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::limits::validate_fields;
use super::model::{DEFAULT_COLOR, DEFAULT_ICON, Persona, PersonaCategory};
use crate::error::Result;

/// Request to create a new persona.
///
/// Used by the persona form, by duplicate-free imports, and by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePersonaRequest {
    /// Display name (required)
    pub name: String,

    /// System instruction text (required)
    pub prompt: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PersonaCategory>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CreatePersonaRequest {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Validate the request and return errors if any.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.name, &self.prompt, self.description.as_deref())
    }

    /// Convert this request into a custom persona, always generating a new id.
    pub fn into_persona(self) -> Persona {
        let now = Utc::now();
        Persona {
            id: Persona::new_id(),
            name: self.name.trim().to_string(),
            prompt: self.prompt,
            description: self.description,
            category: self.category.unwrap_or_default(),
            color: Some(self.color.unwrap_or_else(|| DEFAULT_COLOR.to_string())),
            icon: Some(self.icon.unwrap_or_else(|| DEFAULT_ICON.to_string())),
            is_default: false,
            is_custom: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a persona. `None` leaves the field untouched.
///
/// `id`, `is_default` and `is_custom` cannot be updated here: ids are
/// immutable and the flags belong to the sync coordinator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePersonaRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PersonaCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl UpdatePersonaRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.prompt.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.color.is_none()
            && self.icon.is_none()
    }

    /// Merges the request into `persona`, validating the merged result first.
    ///
    /// On error `persona` is left unchanged.
    pub fn apply_to(&self, persona: &mut Persona) -> Result<()> {
        let name = self.name.as_deref().unwrap_or(&persona.name);
        let prompt = self.prompt.as_deref().unwrap_or(&persona.prompt);
        let description = self
            .description
            .as_deref()
            .or(persona.description.as_deref());
        validate_fields(name, prompt, description)?;

        if let Some(name) = &self.name {
            persona.name = name.trim().to_string();
        }
        if let Some(prompt) = &self.prompt {
            persona.prompt = prompt.clone();
        }
        if let Some(description) = &self.description {
            persona.description = Some(description.clone());
        }
        if let Some(category) = self.category {
            persona.category = category;
        }
        if let Some(color) = &self.color {
            persona.color = Some(color.clone());
        }
        if let Some(icon) = &self.icon {
            persona.icon = Some(icon.clone());
        }
        persona.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_validate_success() {
        let req = CreatePersonaRequest::new("Test Persona", "You are a tester.");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_name() {
        let req = CreatePersonaRequest::new("", "You are a tester.");
        assert!(req.validate().unwrap_err().is_validation());
    }

    #[test]
    fn test_validate_empty_prompt() {
        let req = CreatePersonaRequest::new("Tester", "   ");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_into_persona_applies_defaults() {
        let persona = CreatePersonaRequest::new("Tester", "Prompt").into_persona();
        assert!(Uuid::parse_str(&persona.id).is_ok());
        assert_eq!(persona.category, PersonaCategory::Other);
        assert_eq!(persona.color.as_deref(), Some(DEFAULT_COLOR));
        assert_eq!(persona.icon.as_deref(), Some(DEFAULT_ICON));
        assert!(persona.is_custom);
        assert!(!persona.is_default);
    }

    #[test]
    fn test_update_merges_fields() {
        let mut persona = CreatePersonaRequest::new("Tester", "Prompt").into_persona();
        let before = persona.updated_at;
        let update = UpdatePersonaRequest {
            prompt: Some("New prompt".to_string()),
            category: Some(PersonaCategory::Technical),
            ..Default::default()
        };
        update.apply_to(&mut persona).unwrap();
        assert_eq!(persona.name, "Tester");
        assert_eq!(persona.prompt, "New prompt");
        assert_eq!(persona.category, PersonaCategory::Technical);
        assert!(persona.updated_at >= before);
    }

    #[test]
    fn test_invalid_update_leaves_persona_untouched() {
        let mut persona = CreatePersonaRequest::new("Tester", "Prompt").into_persona();
        let snapshot = persona.clone();
        let update = UpdatePersonaRequest {
            name: Some(String::new()),
            prompt: Some("Other".to_string()),
            ..Default::default()
        };
        assert!(update.apply_to(&mut persona).is_err());
        assert_eq!(persona, snapshot);
    }
}
