//! Field and collection limits shared by local validation and the remote store.
//!
//! The remote store rejects (HTTP 400) any collection that breaks these
//! limits, so the same checks run locally before anything is persisted.

use super::collection::PersonaCollection;
use super::model::Persona;
use crate::error::{AlexiError, Result};

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_PROMPT_CHARS: usize = 5000;
pub const MAX_DESCRIPTION_CHARS: usize = 500;
pub const MAX_COLLECTION_SIZE: usize = 50;

/// Checks the name/prompt/description fields of a persona-like value.
pub fn validate_fields(name: &str, prompt: &str, description: Option<&str>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AlexiError::validation("Name is required and cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AlexiError::validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_CHARS
        )));
    }
    if prompt.trim().is_empty() {
        return Err(AlexiError::validation("Prompt is required and cannot be empty"));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AlexiError::validation(format!(
            "Prompt must be at most {} characters",
            MAX_PROMPT_CHARS
        )));
    }
    if let Some(description) = description
        && description.chars().count() > MAX_DESCRIPTION_CHARS
    {
        return Err(AlexiError::validation(format!(
            "Description must be at most {} characters",
            MAX_DESCRIPTION_CHARS
        )));
    }
    Ok(())
}

pub fn validate_persona(persona: &Persona) -> Result<()> {
    validate_fields(&persona.name, &persona.prompt, persona.description.as_deref())
}

/// Checks a whole collection the way the remote store does on POST.
pub fn validate_collection(collection: &PersonaCollection) -> Result<()> {
    if collection.personas.len() > MAX_COLLECTION_SIZE {
        return Err(AlexiError::validation(format!(
            "Collection holds {} personas, the limit is {}",
            collection.personas.len(),
            MAX_COLLECTION_SIZE
        )));
    }
    for persona in &collection.personas {
        validate_persona(persona)
            .map_err(|e| AlexiError::validation(format!("Persona '{}': {}", persona.id, e)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_fields() {
        assert!(validate_fields("Name", "Prompt", None).is_ok());
        assert!(validate_fields("  ", "Prompt", None).is_err());
        assert!(validate_fields("Name", "", None).is_err());
        assert!(validate_fields(&"n".repeat(101), "Prompt", None).is_err());
        assert!(validate_fields("Name", &"p".repeat(5001), None).is_err());
        assert!(validate_fields("Name", "Prompt", Some(&"d".repeat(501))).is_err());
        assert!(validate_fields("Name", "Prompt", Some(&"d".repeat(500))).is_ok());
    }

    #[test]
    fn test_limits_count_characters_not_bytes() {
        let name = "é".repeat(MAX_NAME_CHARS);
        assert!(validate_fields(&name, "Prompt", None).is_ok());
    }

    #[test]
    fn test_validate_collection_size() {
        let mut collection = PersonaCollection::empty();
        for i in 0..=MAX_COLLECTION_SIZE {
            let mut persona = crate::persona::get_default_presets().remove(0);
            persona.id = format!("p-{}", i);
            collection.personas.push(persona);
        }
        let err = validate_collection(&collection).unwrap_err();
        assert!(err.is_validation());
    }
}
