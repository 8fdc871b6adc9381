//! Error types for the Alexi application.

use thiserror::Error;

/// A shared error type for the entire Alexi application.
///
/// The first group of variants is the user-facing taxonomy that callers are
/// expected to match on (persona mutations, link import, chat completion).
/// The second group covers the plumbing underneath (I/O, serialization,
/// configuration) and is mostly logged rather than shown.
#[derive(Error, Debug, Clone)]
pub enum AlexiError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A persona-set invariant would be broken by the requested change
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Imported or linked payload has the wrong shape
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A linked resource is not publicly accessible
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Classified non-2xx answer from an upstream service
    #[error("Upstream error ({status}): {message}{}", attempt_suffix(.attempts))]
    Upstream {
        status: u16,
        message: String,
        attempts: u32,
    },

    /// 2xx answer whose body lacks the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Transport failure without an HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// The caller abandoned the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Input rejected before any state changed
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data access error (cache/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn attempt_suffix(attempts: &u32) -> String {
    if *attempts > 1 {
        format!(" (after {} attempts)", attempts)
    } else {
        String::new()
    }
}

impl AlexiError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InvariantViolation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Creates an InvalidFormat error
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat(message.into())
    }

    /// Creates a PermissionDenied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Creates an Upstream error
    pub fn upstream(status: u16, message: impl Into<String>, attempts: u32) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
            attempts,
        }
    }

    /// Creates a MalformedResponse error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvariantViolation error
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }

    /// Check if this is an InvalidFormat error
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat(_))
    }

    /// Check if this is a PermissionDenied error
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }

    /// Check if this is an Upstream error
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }

    /// Check if this is a Network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Check if this is a Cancelled error
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP status carried by an Upstream error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AlexiError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AlexiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AlexiError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AlexiError>`.
pub type Result<T> = std::result::Result<T, AlexiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_without_retries() {
        let err = AlexiError::upstream(404, "model not found", 1);
        assert_eq!(err.to_string(), "Upstream error (404): model not found");
    }

    #[test]
    fn test_upstream_display_with_retries() {
        let err = AlexiError::upstream(500, "internal error", 3);
        assert_eq!(
            err.to_string(),
            "Upstream error (500): internal error (after 3 attempts)"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_predicates() {
        assert!(AlexiError::not_found("persona", "x").is_not_found());
        assert!(AlexiError::permission_denied("private").is_permission_denied());
        assert!(!AlexiError::invalid_format("nope").is_permission_denied());
        assert!(AlexiError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: AlexiError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AlexiError::Serialization { ref format, .. } if format == "JSON"));
    }
}
