//! Fatal run errors.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::platform::TransportError;
use crate::syllabus::SyllabusError;

/// Conditions that abort a course run.
///
/// Per-item extraction failures are not here; they only raise the run's error flag.
#[derive(Debug, Error)]
pub enum RunError {
    /// The syllabus document was missing a required key.
    #[error(transparent)]
    Syllabus(#[from] SyllabusError),

    /// The catalog failed even after the schema was created.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A bootstrap request (course lookup, enrollment listing) failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No syllabus endpoint answered for the class.
    #[error("no syllabus endpoint answered for '{class_name}': {source}\n  Suggestion: Check the class name and that you are enrolled")]
    SyllabusUnavailable {
        class_name: String,
        #[source]
        source: TransportError,
    },

    /// A bootstrap document lacked a required key.
    #[error("{endpoint} response for '{class_name}' has no `{key}`\n  Suggestion: Check the class name; the course may not exist")]
    MalformedResponse {
        endpoint: &'static str,
        class_name: String,
        key: &'static str,
    },
}
