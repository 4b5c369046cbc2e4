//! Flat item index used to recover items of degenerate lessons.
//!
//! Some assignment-only lessons come back from the syllabus endpoint with an
//! empty item list. The separately fetched `onDemandCourseMaterials.v1`
//! listing still carries those items, tagged with their `lessonId`.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::ItemRecord;
use super::raw::RawItem;

/// Linked table holding the flat item listing.
pub const FLAT_ITEMS_TABLE: &str = "onDemandCourseMaterialItems.v1";

/// Items keyed by the external id of the lesson they belong to.
#[derive(Debug, Clone, Default)]
pub struct ItemIndex {
    by_lesson: HashMap<String, ItemRecord>,
}

impl ItemIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from a flat item listing document.
    ///
    /// Entries without a `lessonId` are ignored; when several items share a
    /// lesson the first one wins. A document without the table yields an
    /// empty index.
    #[must_use]
    pub fn from_document(document: &Value) -> Self {
        let mut index = Self::new();
        let Some(entries) = document
            .get("linked")
            .and_then(|linked| linked.get(FLAT_ITEMS_TABLE))
            .and_then(Value::as_array)
        else {
            debug!("Flat item listing has no item table; fallback index is empty");
            return index;
        };

        for entry in entries {
            let Ok(raw) = serde_json::from_value::<RawItem>(entry.clone()) else {
                continue;
            };
            let (Some(lesson_id), Some(item_id)) = (raw.lesson_id.clone(), raw.id.clone()) else {
                continue;
            };
            index
                .by_lesson
                .entry(lesson_id)
                .or_insert_with(|| raw.into_record(&item_id));
        }
        index
    }

    /// Registers `item` as the sole item of `lesson_id` unless one is already indexed.
    pub fn insert(&mut self, lesson_id: impl Into<String>, item: ItemRecord) {
        self.by_lesson.entry(lesson_id.into()).or_insert(item);
    }

    /// Returns the item indexed for `lesson_id`.
    #[must_use]
    pub fn get(&self, lesson_id: &str) -> Option<&ItemRecord> {
        self.by_lesson.get(lesson_id)
    }

    /// Returns the number of indexed lessons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_lesson.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_lesson.is_empty()
    }
}
