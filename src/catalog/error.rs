//! Error types for catalog operations.

use std::fmt;

use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::db::DbError;

/// What kind of database failure a catalog operation hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogDbErrorKind {
    /// A catalog table does not exist yet; triggers the one schema retry.
    SchemaMissing,
    /// Unique, foreign-key, not-null, or check constraint rejected the write.
    ConstraintViolation,
    /// The database file is locked by another writer.
    Busy,
    /// Anything else, including connection and pool failures.
    Other,
}

impl CatalogDbErrorKind {
    #[must_use]
    pub fn from_sqlx(error: &sqlx::Error) -> Self {
        let sqlx::Error::Database(db_error) = error else {
            return Self::Other;
        };
        let message = db_error.message();
        if message.starts_with("no such table") {
            return Self::SchemaMissing;
        }
        match db_error.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => Self::ConstraintViolation,
            _ if message.contains("locked") || message.contains("busy") => Self::Busy,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for CatalogDbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SchemaMissing => "missing table",
            Self::ConstraintViolation => "constraint violation",
            Self::Busy => "database busy",
            Self::Other => "database failure",
        })
    }
}

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("catalog write failed ({kind}): {message}")]
    Database {
        kind: CatalogDbErrorKind,
        message: String,
    },

    /// Creating the catalog tables failed.
    #[error(
        "failed to create catalog tables: {0}\n  Suggestion: Check that the database file is writable or delete it to start fresh"
    )]
    SchemaCreation(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database {
            kind: CatalogDbErrorKind::from_sqlx(&error),
            message: error.to_string(),
        }
    }
}

impl From<DbError> for CatalogError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Connection(inner) => Self::from(inner),
            DbError::Migration(inner) => Self::SchemaCreation(inner.to_string()),
        }
    }
}

impl CatalogError {
    /// The database failure kind; `None` for schema creation failures.
    #[must_use]
    pub fn database_kind(&self) -> Option<CatalogDbErrorKind> {
        match self {
            Self::Database { kind, .. } => Some(*kind),
            Self::SchemaCreation(_) => None,
        }
    }

    /// Returns true when the failure was caused by a missing catalog table.
    #[must_use]
    pub fn is_schema_missing(&self) -> bool {
        self.database_kind() == Some(CatalogDbErrorKind::SchemaMissing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_names_kind_in_message() {
        let rendered = CatalogError::Database {
            kind: CatalogDbErrorKind::ConstraintViolation,
            message: "UNIQUE constraint failed: course_references.short_id".to_string(),
        }
        .to_string();
        assert!(rendered.starts_with("catalog write failed (constraint violation)"));
        assert!(rendered.contains("short_id"));
    }

    #[test]
    fn test_catalog_error_schema_missing_flag() {
        let err = CatalogError::Database {
            kind: CatalogDbErrorKind::SchemaMissing,
            message: "no such table: courses".to_string(),
        };
        assert!(err.is_schema_missing());
        assert_eq!(err.database_kind(), Some(CatalogDbErrorKind::SchemaMissing));
    }

    #[test]
    fn test_catalog_error_schema_creation_has_no_db_kind() {
        let err = CatalogError::SchemaCreation("read-only file".to_string());
        assert_eq!(err.database_kind(), None);
        assert!(!err.is_schema_missing());
        assert!(err.to_string().contains("Suggestion"));
    }

    #[test]
    fn test_catalog_db_error_kind_non_database_error_is_other() {
        assert_eq!(
            CatalogDbErrorKind::from_sqlx(&sqlx::Error::RowNotFound),
            CatalogDbErrorKind::Other
        );
        assert_eq!(
            CatalogDbErrorKind::from_sqlx(&sqlx::Error::PoolTimedOut),
            CatalogDbErrorKind::Other
        );
    }

    #[tokio::test]
    async fn test_catalog_db_error_kind_detects_missing_table() {
        let empty = crate::Database::new_in_memory().await.unwrap();
        let missing = sqlx::query("SELECT id FROM modules")
            .fetch_all(empty.pool())
            .await
            .map(|_| ())
            .unwrap_err();

        assert_eq!(CatalogDbErrorKind::from_sqlx(&missing), CatalogDbErrorKind::SchemaMissing);
        assert!(CatalogError::from(missing).is_schema_missing());
    }
}
