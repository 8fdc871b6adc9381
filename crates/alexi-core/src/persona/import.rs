//! Sanitation of externally supplied persona records and the export bundle.
//!
//! Records arrive from share links and pasted bundles as untyped JSON. Only
//! the user-authored fields are read back; ids and flags from foreign data are
//! never trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::model::{DEFAULT_COLOR, DEFAULT_ICON, Persona, PersonaCategory};
use super::request::CreatePersonaRequest;
use crate::error::{AlexiError, Result};

pub const BUNDLE_VERSION: &str = "1.0";

/// Turns one persona-like JSON record into a create request.
///
/// Returns `None` when `name` or `prompt` is missing, not a string, blank, or
/// over the field limits. Unknown categories become `Other` and missing
/// color/icon get the defaults.
pub fn sanitize_record(record: &Value) -> Option<CreatePersonaRequest> {
    let object = record.as_object()?;
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let request = CreatePersonaRequest {
        name: text("name")?,
        prompt: text("prompt")?,
        description: text("description"),
        category: Some(
            text("category")
                .map(|c| PersonaCategory::parse_lenient(&c))
                .unwrap_or_default(),
        ),
        color: Some(text("color").unwrap_or_else(|| DEFAULT_COLOR.to_string())),
        icon: Some(text("icon").unwrap_or_else(|| DEFAULT_ICON.to_string())),
    };

    request.validate().ok()?;
    Some(request)
}

/// File-level export format holding the user's custom personas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub personas: Vec<Persona>,
}

impl ExportBundle {
    /// Builds a bundle from the custom personas of `personas`.
    pub fn from_personas<'a>(personas: impl IntoIterator<Item = &'a Persona>) -> Self {
        Self {
            version: BUNDLE_VERSION.to_string(),
            export_date: Utc::now(),
            personas: personas
                .into_iter()
                .filter(|p| p.is_custom)
                .cloned()
                .collect(),
        }
    }
}

/// Extracts the raw `personas` records from a pasted bundle.
pub fn parse_bundle_records(json: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| AlexiError::invalid_format(format!("Bundle is not valid JSON: {}", e)))?;
    match value.get("personas") {
        Some(Value::Array(records)) => Ok(records.clone()),
        _ => Err(AlexiError::invalid_format(
            "Bundle does not contain a personas array",
        )),
    }
}
