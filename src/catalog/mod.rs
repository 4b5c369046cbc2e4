//! Persistent course catalog with idempotent get-or-create upserts.
//!
//! The catalog records every course, module, lesson, item, and course-level
//! reference discovered while walking a syllabus, keyed by the platform's
//! external ids, so that repeated runs against the same course converge on
//! the same rows.
//!
//! # Overview
//!
//! - [`CatalogStore`] - `SQLite`-backed store owning the [`Database`] handle
//! - [`CatalogRepository`] - async seam the orchestrator depends on
//! - [`CatalogError`] - operation error types
//!
//! Every upsert runs in its own transaction and follows first-write-wins:
//! an existing row is returned untouched, never updated. When the tables do
//! not exist yet the store creates them once and retries the same operation;
//! a second failure is returned to the caller.
//!
//! # Example
//!
//! ```ignore
//! use coursedl_core::catalog::{CatalogStore, NewCourse};
//! use coursedl_core::Database;
//!
//! let store = CatalogStore::new(Database::open(Path::new("coursera-dl.db")).await?);
//! let course = store
//!     .get_or_create_course(&NewCourse { course_id: "Gtv4Xb1-EeS-ViIACwYKVQ", name: "Machine Learning", slug: "ml" })
//!     .await?;
//! ```

mod entity;
mod error;
mod repository;

pub use entity::{
    CourseAssetRow, CourseRow, EntityKind, ItemRow, LessonRow, ModuleRow, NewCourse,
    NewCourseAsset, NewItem, NewLesson, NewModule, NewReference, NewVideoAsset, ReferenceRow,
    VideoAssetRow,
};
pub use error::{CatalogDbErrorKind, CatalogError};
pub use repository::CatalogRepository;

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqliteConnection};
use tracing::{debug, instrument, warn};

use crate::db::Database;

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog store backed by `SQLite`.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    db: Database,
}

async fn find_by_key<T>(conn: &mut SqliteConnection, kind: EntityKind, key: &str) -> Result<Option<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT * FROM {} WHERE {} = ?",
        kind.table(),
        kind.key_column()
    );
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(key)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

impl CatalogStore {
    /// Creates a catalog store over the given database handle.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns the underlying database handle.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Runs `op`, creating the schema and retrying exactly once if a table is missing.
    async fn with_schema_retry<T, F, Fut>(&self, kind: EntityKind, key: &str, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match op().await {
            Err(error) if error.is_schema_missing() => {
                warn!(
                    entity = %kind,
                    key,
                    error = %error,
                    "Catalog schema missing; creating tables and retrying once"
                );
                self.db.create_tables().await?;
                op().await
            }
            result => result,
        }
    }

    /// Returns the course with `course.course_id`, inserting it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the write fails (including a
    /// second missing-table failure after schema creation).
    #[instrument(skip(self, course), fields(course_id = %course.course_id))]
    pub async fn get_or_create_course(&self, course: &NewCourse<'_>) -> Result<CourseRow> {
        self.with_schema_retry(EntityKind::Course, course.course_id, move || {
            self.try_course(course)
        })
        .await
    }

    async fn try_course(&self, course: &NewCourse<'_>) -> Result<CourseRow> {
        let mut tx = self.db.pool().begin().await?;
        if let Some(row) = find_by_key(&mut tx, EntityKind::Course, course.course_id).await? {
            tx.commit().await?;
            return Ok(row);
        }

        let row = sqlx::query_as::<_, CourseRow>(
            r"INSERT INTO courses (course_id, name, slug)
              VALUES (?, ?, ?)
              RETURNING *",
        )
        .bind(course.course_id)
        .bind(course.name)
        .bind(course.slug)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(id = row.id, slug = %row.slug, "Created course");
        Ok(row)
    }

    /// Returns the module with `module.module_id`, inserting it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the write fails.
    #[instrument(skip(self, module), fields(module_id = %module.module_id))]
    pub async fn get_or_create_module(&self, module: &NewModule<'_>) -> Result<ModuleRow> {
        self.with_schema_retry(EntityKind::Module, module.module_id, move || {
            self.try_module(module)
        })
        .await
    }

    async fn try_module(&self, module: &NewModule<'_>) -> Result<ModuleRow> {
        let mut tx = self.db.pool().begin().await?;
        if let Some(row) = find_by_key(&mut tx, EntityKind::Module, module.module_id).await? {
            tx.commit().await?;
            return Ok(row);
        }

        let row = sqlx::query_as::<_, ModuleRow>(
            r"INSERT INTO modules (module_id, course, name, slug, description)
              VALUES (?, ?, ?, ?, ?)
              RETURNING *",
        )
        .bind(module.module_id)
        .bind(module.course)
        .bind(module.name)
        .bind(module.slug)
        .bind(module.description)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Returns the lesson with `lesson.lesson_id`, inserting it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the write fails.
    #[instrument(skip(self, lesson), fields(lesson_id = %lesson.lesson_id))]
    pub async fn get_or_create_lesson(&self, lesson: &NewLesson<'_>) -> Result<LessonRow> {
        self.with_schema_retry(EntityKind::Lesson, lesson.lesson_id, move || {
            self.try_lesson(lesson)
        })
        .await
    }

    async fn try_lesson(&self, lesson: &NewLesson<'_>) -> Result<LessonRow> {
        let mut tx = self.db.pool().begin().await?;
        if let Some(row) = find_by_key(&mut tx, EntityKind::Lesson, lesson.lesson_id).await? {
            tx.commit().await?;
            return Ok(row);
        }

        let row = sqlx::query_as::<_, LessonRow>(
            r"INSERT INTO lessons (lesson_id, module, name, slug)
              VALUES (?, ?, ?, ?)
              RETURNING *",
        )
        .bind(lesson.lesson_id)
        .bind(lesson.module)
        .bind(lesson.name)
        .bind(lesson.slug)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Returns the item with `item.item_id`, inserting it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the write fails.
    #[instrument(skip(self, item), fields(item_id = %item.item_id))]
    pub async fn get_or_create_item(&self, item: &NewItem<'_>) -> Result<ItemRow> {
        self.with_schema_retry(EntityKind::Item, item.item_id, move || self.try_item(item))
            .await
    }

    async fn try_item(&self, item: &NewItem<'_>) -> Result<ItemRow> {
        let mut tx = self.db.pool().begin().await?;
        if let Some(row) = find_by_key(&mut tx, EntityKind::Item, item.item_id).await? {
            tx.commit().await?;
            return Ok(row);
        }

        let row = sqlx::query_as::<_, ItemRow>(
            r"INSERT INTO items (item_id, lesson, module, name, slug, type_name)
              VALUES (?, ?, ?, ?, ?, ?)
              RETURNING *",
        )
        .bind(item.item_id)
        .bind(item.lesson)
        .bind(item.module)
        .bind(item.name)
        .bind(item.slug)
        .bind(item.type_name)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Returns the reference with `reference.ref_id`, inserting it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the write fails, including a
    /// constraint violation when a new reference reuses an existing short id.
    #[instrument(skip(self, reference), fields(ref_id = %reference.ref_id))]
    pub async fn get_or_create_reference(
        &self,
        reference: &NewReference<'_>,
    ) -> Result<ReferenceRow> {
        self.with_schema_retry(EntityKind::Reference, reference.ref_id, move || {
            self.try_reference(reference)
        })
        .await
    }

    async fn try_reference(&self, reference: &NewReference<'_>) -> Result<ReferenceRow> {
        let mut tx = self.db.pool().begin().await?;
        if let Some(row) = find_by_key(&mut tx, EntityKind::Reference, reference.ref_id).await? {
            tx.commit().await?;
            return Ok(row);
        }

        let row = sqlx::query_as::<_, ReferenceRow>(
            r"INSERT INTO course_references (ref_id, course, short_id, name, slug)
              VALUES (?, ?, ?, ?, ?)
              RETURNING *",
        )
        .bind(reference.ref_id)
        .bind(reference.course)
        .bind(reference.short_id)
        .bind(reference.name)
        .bind(reference.slug)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Returns the lecture asset with `asset.asset_id`, inserting it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the write fails.
    #[instrument(skip(self, asset), fields(asset_id = %asset.asset_id))]
    pub async fn get_or_create_course_asset(
        &self,
        asset: &NewCourseAsset<'_>,
    ) -> Result<CourseAssetRow> {
        self.with_schema_retry(EntityKind::CourseAsset, asset.asset_id, move || {
            self.try_course_asset(asset)
        })
        .await
    }

    async fn try_course_asset(&self, asset: &NewCourseAsset<'_>) -> Result<CourseAssetRow> {
        let mut tx = self.db.pool().begin().await?;
        if let Some(row) = find_by_key(&mut tx, EntityKind::CourseAsset, asset.asset_id).await? {
            tx.commit().await?;
            return Ok(row);
        }

        let row = sqlx::query_as::<_, CourseAssetRow>(
            r"INSERT INTO course_assets (asset_id, asset_type, name, slug)
              VALUES (?, ?, ?, ?)
              RETURNING *",
        )
        .bind(asset.asset_id)
        .bind(asset.asset_type)
        .bind(asset.name)
        .bind(asset.slug)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Records that an item exposes a lecture asset. Repeated links are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the write fails.
    #[instrument(skip(self))]
    pub async fn link_item_asset(&self, item: i64, asset: i64) -> Result<()> {
        let key = format!("{item}:{asset}");
        self.with_schema_retry(EntityKind::CourseAsset, &key, move || async move {
            sqlx::query("INSERT OR IGNORE INTO item_assets (item, asset) VALUES (?, ?)")
                .bind(item)
                .bind(asset)
                .execute(self.db.pool())
                .await?;
            Ok(())
        })
        .await
    }

    /// Returns the video record with `video.asset_id`, inserting it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the write fails.
    #[instrument(skip(self, video), fields(asset_id = %video.asset_id))]
    pub async fn get_or_create_video_asset(
        &self,
        video: &NewVideoAsset<'_>,
    ) -> Result<VideoAssetRow> {
        self.with_schema_retry(EntityKind::VideoAsset, video.asset_id, move || {
            self.try_video_asset(video)
        })
        .await
    }

    async fn try_video_asset(&self, video: &NewVideoAsset<'_>) -> Result<VideoAssetRow> {
        let mut tx = self.db.pool().begin().await?;
        if let Some(row) = find_by_key(&mut tx, EntityKind::VideoAsset, video.asset_id).await? {
            tx.commit().await?;
            return Ok(row);
        }

        let row = sqlx::query_as::<_, VideoAssetRow>(
            r"INSERT INTO item_video_assets (asset_id, item, subtitles)
              VALUES (?, ?, ?)
              RETURNING *",
        )
        .bind(video.asset_id)
        .bind(video.item)
        .bind(video.subtitles)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(id = row.id, subtitles = %row.subtitles, "Recorded lecture video");
        Ok(row)
    }

    /// Looks up a course by its platform id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the query fails.
    pub async fn find_course(&self, course_id: &str) -> Result<Option<CourseRow>> {
        let mut conn = self.db.pool().acquire().await?;
        find_by_key(&mut conn, EntityKind::Course, course_id).await
    }

    /// Returns the number of rows stored for an entity kind.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Database`] if the query fails.
    pub async fn count(&self, kind: EntityKind) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(self.db.pool()).await?;
        Ok(count)
    }
}
