//! Catalog row types and the attribute sets used to create them.

use std::fmt;

use sqlx::FromRow;

/// The kinds of entity the catalog persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Course,
    Module,
    Lesson,
    Item,
    Reference,
    CourseAsset,
    VideoAsset,
}

impl EntityKind {
    /// Returns the backing table name.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Course => "courses",
            Self::Module => "modules",
            Self::Lesson => "lessons",
            Self::Item => "items",
            Self::Reference => "course_references",
            Self::CourseAsset => "course_assets",
            Self::VideoAsset => "item_video_assets",
        }
    }

    /// Returns the column holding the platform-assigned external id.
    #[must_use]
    pub fn key_column(self) -> &'static str {
        match self {
            Self::Course => "course_id",
            Self::Module => "module_id",
            Self::Lesson => "lesson_id",
            Self::Item => "item_id",
            Self::Reference => "ref_id",
            Self::CourseAsset | Self::VideoAsset => "asset_id",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Course => "course",
            Self::Module => "module",
            Self::Lesson => "lesson",
            Self::Item => "item",
            Self::Reference => "reference",
            Self::CourseAsset => "course_asset",
            Self::VideoAsset => "video_asset",
        };
        write!(f, "{label}")
    }
}

/// A persisted course. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CourseRow {
    pub id: i64,
    /// Platform course id.
    pub course_id: String,
    /// Display name.
    pub name: String,
    /// Class name used to look the course up.
    pub slug: String,
}

/// A persisted module (week).
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ModuleRow {
    pub id: i64,
    pub module_id: String,
    /// Row id of the owning course.
    pub course: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// A persisted lesson.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LessonRow {
    pub id: i64,
    pub lesson_id: String,
    /// Row id of the owning module.
    pub module: i64,
    pub name: String,
    pub slug: String,
}

/// A persisted item. `module` is denormalized from the lesson for fast lookup.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ItemRow {
    pub id: i64,
    pub item_id: String,
    pub lesson: i64,
    pub module: i64,
    pub name: String,
    pub slug: String,
    pub type_name: String,
}

/// A persisted course-level reference.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ReferenceRow {
    pub id: i64,
    pub ref_id: String,
    pub course: i64,
    pub short_id: String,
    pub slug: String,
    pub name: String,
}

/// A persisted lecture asset.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CourseAssetRow {
    pub id: i64,
    pub asset_id: String,
    pub asset_type: String,
    pub slug: String,
    pub name: String,
    pub saved_path: String,
}

/// The video behind a lecture item and the subtitle languages it offers.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct VideoAssetRow {
    pub id: i64,
    /// Platform video id.
    pub asset_id: String,
    pub item: i64,
    /// Comma-separated subtitle language codes.
    pub subtitles: String,
    pub saved_path: String,
}

/// Attributes for creating a course.
#[derive(Debug, Clone, Copy)]
pub struct NewCourse<'a> {
    pub course_id: &'a str,
    pub name: &'a str,
    pub slug: &'a str,
}

/// Attributes for creating a module.
#[derive(Debug, Clone, Copy)]
pub struct NewModule<'a> {
    pub module_id: &'a str,
    pub course: i64,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: &'a str,
}

/// Attributes for creating a lesson.
#[derive(Debug, Clone, Copy)]
pub struct NewLesson<'a> {
    pub lesson_id: &'a str,
    pub module: i64,
    pub name: &'a str,
    pub slug: &'a str,
}

/// Attributes for creating an item.
#[derive(Debug, Clone, Copy)]
pub struct NewItem<'a> {
    pub item_id: &'a str,
    pub lesson: i64,
    pub module: i64,
    pub name: &'a str,
    pub slug: &'a str,
    pub type_name: &'a str,
}

/// Attributes for creating a course-level reference.
#[derive(Debug, Clone, Copy)]
pub struct NewReference<'a> {
    pub ref_id: &'a str,
    pub course: i64,
    pub short_id: &'a str,
    pub name: &'a str,
    pub slug: &'a str,
}

/// Attributes for creating a lecture asset record.
#[derive(Debug, Clone, Copy)]
pub struct NewCourseAsset<'a> {
    pub asset_id: &'a str,
    pub asset_type: &'a str,
    pub name: &'a str,
    pub slug: &'a str,
}

/// Attributes for recording a lecture's video.
#[derive(Debug, Clone, Copy)]
pub struct NewVideoAsset<'a> {
    pub asset_id: &'a str,
    pub item: i64,
    pub subtitles: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_tables_and_keys() {
        assert_eq!(EntityKind::Course.table(), "courses");
        assert_eq!(EntityKind::Reference.table(), "course_references");
        assert_eq!(EntityKind::Item.key_column(), "item_id");
        assert_eq!(EntityKind::CourseAsset.key_column(), "asset_id");
        assert_eq!(EntityKind::VideoAsset.table(), "item_video_assets");
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Lesson.to_string(), "lesson");
        assert_eq!(EntityKind::CourseAsset.to_string(), "course_asset");
    }
}
