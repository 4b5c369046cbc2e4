//! `SQLite` handle for the course catalog.
//!
//! Opening a database does not create the catalog tables. The tables are
//! created either eagerly through [`Database::new`] or lazily by the
//! [`CatalogStore`](crate::catalog::CatalogStore) the first time an upsert
//! reports a missing table.
//!
//! # Example
//!
//! ```no_run
//! use coursedl_core::Database;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open(Path::new("coursera-dl.db")).await?;
//! db.create_tables().await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{info, instrument};

/// Runs are sequential; a couple of connections covers the odd overlap.
const MAX_CONNECTIONS: u32 = 2;

/// How long a connection waits on a locked file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum DbError {
    #[error("cannot open catalog database: {0}\n  Suggestion: Check the --database path and its directory permissions")]
    Connection(#[from] sqlx::Error),

    #[error("cannot create catalog schema: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Pooled connection to the catalog file.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file without touching the schema.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the file cannot be opened.
    #[instrument(skip(db_path), fields(path = %db_path.display()))]
    pub async fn open(db_path: &Path) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Opens the database file and creates the catalog schema up front.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the connection fails,
    /// or `DbError::Migration` if schema creation fails.
    pub async fn new(db_path: &Path) -> Result<Self, DbError> {
        let db = Self::open(db_path).await?;
        db.create_tables().await?;
        Ok(db)
    }

    /// Creates an empty in-memory database for testing.
    ///
    /// The pool is pinned to a single connection because every SQLite
    /// in-memory connection is its own database. The schema is not created.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the connection fails.
    #[instrument]
    pub async fn new_in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::new()
            .in_memory(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Creates every catalog table. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Migration` if the embedded migrations fail.
    #[instrument(skip(self))]
    pub async fn create_tables(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Catalog schema ready");
        Ok(())
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Whether the file is in write-ahead-log mode.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the pragma query fails.
    pub async fn is_wal_enabled(&self) -> Result<bool, DbError> {
        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&self.pool)
            .await?;
        Ok(mode.eq_ignore_ascii_case("wal"))
    }

    /// Closes every pooled connection.
    #[instrument(skip(self))]
    pub async fn close(self) {
        self.pool.close().await;
    }
}
