//! Error types for the form engine
//!
//! Only schema-authoring and I/O problems are errors. A user value that fails
//! a field's rule is a message in [`crate::Errors`], never an `Err`.

use thiserror::Error;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Severity levels for error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Potential issue but the form can still be used
    Warning,
    /// One operation failed, the form itself is intact
    Error,
    /// The form cannot be built; the schema has to be fixed
    Critical,
}

/// Trait for error types that have severity levels
pub trait Severity {
    /// Classify this error
    fn severity(&self) -> ErrorSeverity;
}

/// Errors that can occur while building or driving a form
#[derive(Debug, Error)]
pub enum FormError {
    /// A schema entry names a type tag the field class does not know
    #[error("unknown field type '{field_type}' for field '{key}'")]
    UnknownFieldType { key: String, field_type: String },

    /// A widget rejected the options it was given
    #[error("malformed options on field '{key}': {message}")]
    MalformedOptions { key: String, message: String },

    /// Two entries in one schema set share a key
    #[error("duplicate field key: {key}")]
    DuplicateKey { key: String },

    /// A change or event addressed a key that is not in the schema set
    #[error("field not found: {key}")]
    UnknownField { key: String },

    /// A keyed entry declares a `key` that differs from its mapping key
    #[error("field '{key}' declares a different key '{declared}'")]
    KeyMismatch { key: String, declared: String },

    /// A declarative validation rule could not be compiled
    #[error("invalid validation rule: {message}")]
    InvalidRule { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl FormError {
    /// Shorthand for [`FormError::MalformedOptions`].
    pub fn malformed(key: impl Into<String>, message: impl Into<String>) -> Self {
        FormError::MalformedOptions {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl Severity for FormError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            FormError::UnknownFieldType { .. }
            | FormError::MalformedOptions { .. }
            | FormError::DuplicateKey { .. }
            | FormError::KeyMismatch { .. }
            | FormError::InvalidRule { .. } => ErrorSeverity::Critical,
            FormError::UnknownField { .. } => ErrorSeverity::Warning,
            FormError::Io(_) | FormError::Json(_) | FormError::Yaml(_) => ErrorSeverity::Error,
        }
    }
}
