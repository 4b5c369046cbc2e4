//! Syllabus adaptation and normalization.
//!
//! The platform has served course syllabi in three incompatible shapes over
//! time. Each shape has its own [`SchemaAdapter`] strategy that parses the raw
//! JSON into the shared [`Syllabus`] records; [`normalize`] then turns that
//! into the [`CanonicalTree`] every later stage works on.
//!
//! # Architecture
//!
//! - [`LinkedCollectionsAdapter`] - id-indexed `linked` tables (`onDemandCourseMaterials.v2`)
//! - [`FlatWeeksAdapter`] - weeks with id-keyed lesson/item objects
//! - [`CourseMaterialAdapter`] - physically nested `courseMaterial` tree
//! - [`ItemIndex`] - flat item listing used to fill degenerate lessons
//!
//! The caller picks the variant from the endpoint that answered; the adapter
//! never guesses from content.
//!
//! # Example
//!
//! ```
//! use coursedl_core::syllabus::{ItemIndex, NormalizeOptions, SchemaVariant, adapt, normalize};
//! use serde_json::json;
//!
//! let raw = json!({"courseMaterial": {"elements": []}});
//! let syllabus = adapt(&raw, SchemaVariant::CourseMaterial, "course-1").unwrap();
//! let tree = normalize(syllabus, NormalizeOptions::default(), &ItemIndex::new());
//! assert!(tree.is_empty());
//! ```

mod error;
mod index;
mod linked;
mod material;
mod normalize;
mod raw;
mod weeks;

pub use error::SyllabusError;
pub use index::{FLAT_ITEMS_TABLE, ItemIndex};
pub use linked::LinkedCollectionsAdapter;
pub use material::CourseMaterialAdapter;
pub use normalize::{CanonicalTree, NormalizeOptions, Outline, normalize};
pub use weeks::FlatWeeksAdapter;

use std::fmt;

use serde_json::Value;

/// The known syllabus document shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVariant {
    /// Separate id-indexed module/lesson/item tables under `linked`.
    LinkedCollections,
    /// Ordered weeks referencing id-keyed lesson and item objects.
    FlatWeeks,
    /// Physically nested `courseMaterial` tree.
    CourseMaterial,
}

impl SchemaVariant {
    /// Every variant, in the order the orchestrator probes their endpoints.
    pub const ALL: [Self; 3] = [Self::LinkedCollections, Self::FlatWeeks, Self::CourseMaterial];

    /// Returns the adapter strategy for this variant.
    #[must_use]
    pub fn adapter(self) -> &'static dyn SchemaAdapter {
        match self {
            Self::LinkedCollections => &LinkedCollectionsAdapter,
            Self::FlatWeeks => &FlatWeeksAdapter,
            Self::CourseMaterial => &CourseMaterialAdapter,
        }
    }

    /// Returns the stable label for logs and errors.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinkedCollections => "linked-collections",
            Self::FlatWeeks => "flat-weeks",
            Self::CourseMaterial => "course-material",
        }
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A syllabus item with enough payload for link extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Content-type tag (`lecture`, `quiz`, ...). Empty when the document had none.
    pub type_name: String,
    /// Video id for lectures whose video differs from the item id.
    pub video_id: Option<String>,
    /// Lecture asset ids carried inline by the document.
    pub asset_ids: Vec<String>,
}

/// A lesson and its items in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub items: Vec<ItemRecord>,
}

/// A module (week) and its lessons in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub lessons: Vec<LessonRecord>,
}

/// Variant-independent syllabus produced by a [`SchemaAdapter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Syllabus {
    pub modules: Vec<ModuleRecord>,
}

/// Strategy that parses one syllabus document shape.
pub trait SchemaAdapter: Send + Sync {
    /// The variant this adapter understands.
    fn variant(&self) -> SchemaVariant;

    /// Parses `document` into the shared records.
    ///
    /// Records the document leaves without an id get a positional id
    /// prefixed with `id_scope`, so two courses never share one.
    ///
    /// # Errors
    ///
    /// Returns [`SyllabusError::MalformedDocument`] when a required key is
    /// absent or has the wrong shape.
    fn adapt(&self, document: &Value, id_scope: &str) -> Result<Syllabus, SyllabusError>;
}

/// Adapts `document` using the strategy for `variant`.
///
/// `id_scope` (the course id) prefixes every id synthesized for a record
/// the document leaves anonymous.
///
/// # Errors
///
/// Returns [`SyllabusError::MalformedDocument`] when a required key is absent.
pub fn adapt(
    document: &Value,
    variant: SchemaVariant,
    id_scope: &str,
) -> Result<Syllabus, SyllabusError> {
    variant.adapter().adapt(document, id_scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_adapter_matches_variant() {
        for variant in SchemaVariant::ALL {
            assert_eq!(variant.adapter().variant(), variant);
        }
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(SchemaVariant::LinkedCollections.to_string(), "linked-collections");
        assert_eq!(SchemaVariant::CourseMaterial.to_string(), "course-material");
    }
}
