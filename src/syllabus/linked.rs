//! Linked-collection syllabus (`onDemandCourseMaterials.v2`).
//!
//! Modules, lessons, and items arrive as three flat tables under `linked`;
//! modules reference lessons through `lessonIds` and lessons reference items
//! through `itemIds`. Module order comes from `elements[0].moduleIds` when
//! the course element lists it.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::raw::{RawItem, RawLesson, RawModule, decode, require};
use super::{ItemRecord, LessonRecord, SchemaAdapter, SchemaVariant, Syllabus, SyllabusError};

pub(crate) const MODULES_TABLE: &str = "onDemandCourseMaterialModules.v1";
pub(crate) const LESSONS_TABLE: &str = "onDemandCourseMaterialLessons.v1";
pub(crate) const ITEMS_TABLE: &str = "onDemandCourseMaterialItems.v2";

const VARIANT: SchemaVariant = SchemaVariant::LinkedCollections;

/// Adapter for the linked-collection document shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedCollectionsAdapter;

impl SchemaAdapter for LinkedCollectionsAdapter {
    fn variant(&self) -> SchemaVariant {
        VARIANT
    }

    fn adapt(&self, document: &Value, _id_scope: &str) -> Result<Syllabus, SyllabusError> {
        let course = require(VARIANT, document, "elements")?
            .as_array()
            .and_then(|elements| elements.first())
            .ok_or_else(|| SyllabusError::missing_key(VARIANT, "elements[0]"))?;
        let linked = require(VARIANT, document, "linked")?;

        let modules: Vec<RawModule> =
            decode(VARIANT, MODULES_TABLE, require(VARIANT, linked, MODULES_TABLE)?)?;
        let lessons: Vec<RawLesson> =
            decode(VARIANT, LESSONS_TABLE, require(VARIANT, linked, LESSONS_TABLE)?)?;
        let items: Vec<RawItem> =
            decode(VARIANT, ITEMS_TABLE, require(VARIANT, linked, ITEMS_TABLE)?)?;

        let mut lessons_by_id: HashMap<String, RawLesson> = lessons
            .into_iter()
            .filter_map(|lesson| lesson.id.clone().map(|id| (id, lesson)))
            .collect();
        let mut items_by_id: HashMap<String, RawItem> = items
            .into_iter()
            .filter_map(|item| item.id.clone().map(|id| (id, item)))
            .collect();

        let module_order: Option<Vec<String>> = course
            .get("moduleIds")
            .and_then(|ids| serde_json::from_value(ids.clone()).ok());
        let mut modules_by_id: HashMap<String, RawModule> = HashMap::new();
        let mut table_order = Vec::new();
        for module in modules {
            if let Some(id) = module.id.clone() {
                table_order.push(id.clone());
                modules_by_id.insert(id, module);
            }
        }

        let mut out = Vec::new();
        for module_id in module_order.unwrap_or(table_order) {
            let Some(module) = modules_by_id.remove(&module_id) else {
                debug!(module_id = %module_id, "Module id not present in linked table; skipping");
                continue;
            };

            let lesson_records: Vec<LessonRecord> = module
                .lesson_ids
                .iter()
                .filter_map(|lesson_id| {
                    let lesson = lessons_by_id.remove(lesson_id)?;
                    let item_records: Vec<ItemRecord> = lesson
                        .item_ids
                        .iter()
                        .filter_map(|item_id| {
                            items_by_id
                                .remove(item_id)
                                .map(|item| item.into_record(item_id))
                        })
                        .collect();
                    Some(lesson.into_record(lesson_id, item_records))
                })
                .collect();

            out.push(module.into_record(&module_id, lesson_records));
        }

        Ok(Syllabus { modules: out })
    }
}
