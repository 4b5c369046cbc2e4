//! Per-item extraction errors.

use thiserror::Error;

use crate::platform::TransportError;

/// Why a single item could not be extracted.
///
/// These never abort a run; the orchestrator records them through the
/// aggregate error flag and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The platform request failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response lacked a field the routine needs.
    #[error("{endpoint} response has no `{field}`\n  Suggestion: The platform format may have changed for this item type")]
    MissingField {
        /// Logical endpoint name.
        endpoint: &'static str,
        /// Missing JSON path.
        field: String,
    },

    /// The item type needs the learner id and it could not be obtained.
    #[error("learner id is unknown\n  Suggestion: Check that the CAUTH cookie is valid")]
    MissingUserId,
}

impl ExtractError {
    pub(crate) fn missing(endpoint: &'static str, field: impl Into<String>) -> Self {
        Self::MissingField {
            endpoint,
            field: field.into(),
        }
    }
}
