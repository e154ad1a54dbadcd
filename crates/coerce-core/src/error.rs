//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types surfaced by schema construction and parameter
//! validation. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.
//!
//! ## Design
//!
//! - Configuration errors are programming mistakes in a schema or in the
//!   custom type registry. They are fatal and carry the offending field or
//!   type name.
//! - Parameter errors (`IncorrectParameters`, `MissingParameters`) are
//!   request-scoped and carry the exact, ordered list of field names.
//! - Individual field failures are never raised on their own; only the
//!   aggregate decision produces a parameter error.

use serde::Serialize;
use thiserror::Error;

/// Top-level error returned by validation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoerceError {
    /// The schema or registry is misconfigured. Not recoverable per request.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// One or more present fields failed coercion or a constraint check.
    #[error("incorrect parameters: {}", .fields.join(", "))]
    IncorrectParameters {
        /// Offending field names, in schema order.
        fields: Vec<String>,
    },

    /// One or more required fields were absent and had no default.
    #[error("missing parameters: {}", .fields.join(", "))]
    MissingParameters {
        /// Missing field names, in schema order.
        fields: Vec<String>,
    },
}

impl CoerceError {
    /// Incorrect-parameters error naming a single field.
    pub fn incorrect(field: impl Into<String>) -> Self {
        CoerceError::IncorrectParameters {
            fields: vec![field.into()],
        }
    }

    /// Field names carried by a parameter error. Empty for configuration errors.
    pub fn fields(&self) -> &[String] {
        match self {
            CoerceError::IncorrectParameters { fields }
            | CoerceError::MissingParameters { fields } => fields,
            CoerceError::Configuration(_) => &[],
        }
    }

    /// Whether the error is caused by request input rather than by the schema.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, CoerceError::Configuration(_))
    }

    /// HTTP status a surrounding web layer should map this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            CoerceError::Configuration(_) => 500,
            CoerceError::IncorrectParameters { .. } | CoerceError::MissingParameters { .. } => 400,
        }
    }

    /// Machine-readable discriminant.
    pub fn code(&self) -> &'static str {
        match self {
            CoerceError::Configuration(_) => "configuration_error",
            CoerceError::IncorrectParameters { .. } => "incorrect_parameters",
            CoerceError::MissingParameters { .. } => "missing_parameters",
        }
    }

    /// Response body for an external HTTP layer.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.code(),
            fields: self.fields().to_vec(),
            message: self.to_string(),
        }
    }
}

/// Serializable error body listing the offending fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Discriminant: `incorrect_parameters`, `missing_parameters` or
    /// `configuration_error`.
    pub error: &'static str,
    /// Offending field names.
    pub fields: Vec<String>,
    /// Human-readable summary.
    pub message: String,
}

/// A schema or registry authoring mistake.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// An `enum` field has no allowed values.
    #[error("field '{field}': enum type requires a non-empty set of values")]
    MissingEnumValues {
        /// Field name.
        field: String,
    },

    /// A `regexp` field has no pattern.
    #[error("field '{field}': regexp type requires a pattern")]
    MissingRegex {
        /// Field name.
        field: String,
    },

    /// A pattern failed to compile.
    #[error("field '{field}': invalid pattern: {reason}")]
    InvalidRegex {
        /// Field name.
        field: String,
        /// Compiler message.
        reason: String,
    },

    /// A field refers to a custom type that was never registered.
    #[error("custom type '{name}' is not registered")]
    UnknownCustomType {
        /// Type name.
        name: String,
    },

    /// The same field name appears twice in one schema.
    #[error("field '{field}' is declared more than once")]
    DuplicateField {
        /// Field name.
        field: String,
    },

    /// A `subtype` was set on a field whose kind is not `array_csv`.
    #[error("field '{field}': subtype is only valid for array_csv, not {kind}")]
    SubtypeWithoutCsv {
        /// Field name.
        field: String,
        /// Declared kind.
        kind: String,
    },

    /// An `array_csv` field uses `array_csv` as its element kind.
    #[error("field '{field}': array_csv elements cannot themselves be array_csv")]
    NestedCsv {
        /// Field name.
        field: String,
    },

    /// `min` is greater than `max`.
    #[error("field '{field}': min {min} is greater than max {max}")]
    InvalidBounds {
        /// Field name.
        field: String,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// A bound is NaN or infinite.
    #[error("field '{field}': {bound} must be a finite number, got {value}")]
    NonFiniteBound {
        /// Field name.
        field: String,
        /// `min` or `max`.
        bound: &'static str,
        /// Offending value.
        value: f64,
    },

    /// A custom type name is empty, either at registration or in a field.
    #[error("custom type name must not be empty")]
    EmptyTypeName,

    /// A custom type name shadows a built-in kind that cannot be overridden.
    #[error("custom type name '{name}' is reserved by the type catalog")]
    ReservedTypeName {
        /// Type name.
        name: String,
    },

    /// The process-wide registry was installed twice (or read before install).
    #[error("the process-wide type registry is already installed")]
    RegistryAlreadyInstalled,

    /// A schema document could not be read or parsed.
    #[error("malformed schema '{source_name}': {reason}")]
    MalformedSchema {
        /// File path or other identifier of the document.
        source_name: String,
        /// Parse failure.
        reason: String,
    },
}

/// Error loading [`crate::EngineConfig`] from the environment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An environment variable held an unparsable value.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_fields_in_order() {
        let err = CoerceError::IncorrectParameters {
            fields: vec!["b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "incorrect parameters: b, a");
    }

    #[test]
    fn configuration_errors_are_not_recoverable() {
        let err = CoerceError::from(ConfigurationError::MissingRegex {
            field: "code".into(),
        });
        assert!(!err.is_recoverable());
        assert_eq!(err.status_code(), 500);
        assert!(err.fields().is_empty());
        assert!(err.to_string().contains("code"));
    }

    #[test]
    fn body_carries_discriminant_and_fields() {
        let err = CoerceError::MissingParameters {
            fields: vec!["title".into()],
        };
        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body["error"], "missing_parameters");
        assert_eq!(body["fields"][0], "title");
        assert_eq!(err.status_code(), 400);
    }
}
