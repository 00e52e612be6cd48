//! Error types for the task engine

use planboard_fields::{FieldError, FieldsError};
use thiserror::Error;

/// Result type for task operations
pub type Result<T> = std::result::Result<T, TaskError>;

/// Errors that can occur in task operations
#[derive(Debug, Error)]
pub enum TaskError {
    /// One or more fields are invalid. Every violated field is listed.
    #[error("validation failed: {}", planboard_fields::error::join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Task or property definition does not exist
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// A property deletion could not remove every dependent value
    #[error("cascade delete of property {property} left {remaining} values behind")]
    CascadeIntegrity { property: String, remaining: usize },

    /// Record store failure
    #[error("store error: {message}")]
    Store { message: String },

    /// Configuration could not be loaded
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Registry or codec error
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl TaskError {
    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Field-keyed errors, whether raised by task or definition validation.
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Fields(inner) => inner.field_errors(),
            _ => None,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaskError::not_found("task", "01HZX");
        assert_eq!(err.to_string(), "task not found: 01HZX");
    }

    #[test]
    fn test_field_errors_reach_through_fields_errors() {
        let err = TaskError::from(FieldsError::Validation(vec![FieldError::new(
            "name",
            "cannot be empty",
        )]));
        assert_eq!(err.field_errors().unwrap()[0].field, "name");

        let err = TaskError::Validation(vec![
            FieldError::new("title", "too short"),
            FieldError::new("description", "too long"),
        ]);
        assert_eq!(err.field_errors().unwrap().len(), 2);
        assert!(err.to_string().contains("title: too short"));
    }

    #[test]
    fn test_retryable() {
        assert!(TaskError::store("connection reset").is_retryable());
        assert!(!TaskError::not_found("task", "x").is_retryable());
        assert!(!TaskError::CascadeIntegrity {
            property: "p".into(),
            remaining: 1
        }
        .is_retryable());
    }
}
