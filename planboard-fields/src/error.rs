//! Error types for the property registry and codec

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// A single validation problem, keyed by the field it belongs to.
///
/// Validation never stops at the first problem; callers receive every
/// `FieldError` at once so a form can highlight all offending inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join a list of field errors for display.
pub fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur in registry and codec operations
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Property definition not found by id
    #[error("property not found: {id}")]
    PropertyNotFound { id: String },

    /// Another definition in the same scope already uses this name
    #[error("duplicate property name '{name}' in scope {scope}")]
    DuplicateName { scope: String, name: String },

    /// One or more definition fields are invalid
    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Raw input rejected by a strict codec
    #[error("invalid value for property '{property}': {message}")]
    InvalidValue { property: String, message: String },

    /// Registry directory could not be used
    #[error("registry directory not usable: {path}")]
    NotInitialized { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FieldsError {
    /// Create an invalid value error
    pub fn invalid_value(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            property: property.into(),
            message: message.into(),
        }
    }

    /// The field-keyed errors carried by a validation failure, if any.
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldsError::PropertyNotFound {
            id: "01HZX".into(),
        };
        assert_eq!(err.to_string(), "property not found: 01HZX");
    }

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = FieldsError::Validation(vec![
            FieldError::new("name", "cannot be empty"),
            FieldError::new("options", "dropdown needs at least one option"),
        ]);
        let text = err.to_string();
        assert!(text.contains("name: cannot be empty"));
        assert!(text.contains("options: dropdown needs at least one option"));
        assert_eq!(err.field_errors().map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_invalid_value() {
        let err = FieldsError::invalid_value("Estimate", "not a number");
        assert!(err.to_string().contains("Estimate"));
        assert!(err.field_errors().is_none());
    }
}
