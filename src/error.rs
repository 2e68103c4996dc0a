// src/error.rs
//! Error vocabulary for payload construction.
//!
//! Every builder failure is a caller programming error: none of them are
//! retried, and every message lists the alternatives the caller could
//! have used instead.

use crate::builder::coercion::InputShape;
use crate::types::ValidationError;
use thiserror::Error;

/// Failures raised while coercing input, accumulating mutations or rendering payloads.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("'{field}' cannot accept {found}; accepted input shapes: {}", shape_list(accepted))]
    TypeCoercion {
        field: String,
        found: String,
        accepted: Vec<InputShape>,
    },

    #[error("'{field}' is not a valid name for {owner}; valid names: {}", valid.join(", "))]
    UnknownField {
        owner: String,
        field: String,
        valid: Vec<String>,
    },

    #[error("{owner} is missing required field(s): {}", missing.join(", "))]
    MissingField { owner: String, missing: Vec<String> },

    #[error("'{field}' cannot be updated: {reason}")]
    ImmutableField { field: String, reason: String },

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("'{value}' is not a valid option for '{field}'; valid option names: {}", valid.join(", "))]
    SchemaValidation {
        field: String,
        value: String,
        valid: Vec<String>,
    },

    #[error("Failed to convert the value for '{field}': {source}")]
    Conversion {
        field: String,
        #[source]
        source: Box<BuildError>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl BuildError {
    pub(crate) fn immutable(field: impl Into<String>, reason: impl Into<String>) -> Self {
        BuildError::ImmutableField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_field<I, S>(owner: impl Into<String>, field: &str, valid: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BuildError::UnknownField {
            owner: owner.into(),
            field: field.to_string(),
            valid: valid.into_iter().map(Into::into).collect(),
        }
    }

    /// Wraps an error raised while converting input for `field`.
    pub(crate) fn conversion(field: &str, source: BuildError) -> Self {
        BuildError::Conversion {
            field: field.to_string(),
            source: Box::new(source),
        }
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        BuildError::MalformedResponse(err.to_string())
    }
}

fn shape_list(shapes: &[InputShape]) -> String {
    shapes
        .iter()
        .map(|shape| shape.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Binary-level error: configuration, files and everything the library raises.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error for {path}: {source}")]
    JsonParseError {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type alias for convenience
pub type Result<T, E = BuildError> = std::result::Result<T, E>;
