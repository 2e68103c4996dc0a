use thiserror::Error;

mod colors;
mod ids;
mod objects;
mod rich_text;

pub use colors::*;
pub use ids::*;
pub use objects::*;
pub use rich_text::*;

/// Failures validating a single primitive (id, color, url, date...).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid Notion ID format: {0}")]
    InvalidId(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Invalid icon: {0} is neither an emoji nor an http(s) url")]
    InvalidIcon(String),

    #[error("Invalid date: {input} - {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("Unknown {vocabulary} '{value}'; expected one of: {}", expected.join(", "))]
    UnknownVariant {
        vocabulary: &'static str,
        value: String,
        expected: Vec<&'static str>,
    },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),
}
