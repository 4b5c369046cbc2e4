//! Error types for syllabus adaptation.

use thiserror::Error;

use super::SchemaVariant;

/// Errors raised while adapting a raw syllabus document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyllabusError {
    /// A required structural key is absent or has the wrong shape.
    #[error(
        "malformed {variant} syllabus: `{key}` {reason}\n  Suggestion: The platform may have changed its syllabus format; re-run with -vv and report the response shape"
    )]
    MalformedDocument {
        /// Which document shape was being adapted.
        variant: SchemaVariant,
        /// The offending key path.
        key: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl SyllabusError {
    /// Creates a `MalformedDocument` error for a missing key.
    #[must_use]
    pub fn missing_key(variant: SchemaVariant, key: &str) -> Self {
        Self::MalformedDocument {
            variant,
            key: key.to_string(),
            reason: "is missing".to_string(),
        }
    }

    /// Creates a `MalformedDocument` error for a key whose value could not be decoded.
    #[must_use]
    pub fn invalid_key(variant: SchemaVariant, key: &str, reason: impl std::fmt::Display) -> Self {
        Self::MalformedDocument {
            variant,
            key: key.to_string(),
            reason: format!("could not be decoded: {reason}"),
        }
    }
}
