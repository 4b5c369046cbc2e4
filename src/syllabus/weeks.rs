//! Flat per-week syllabus (`onDemandCourseWeeks.v1`).
//!
//! The document lists weeks in order, each naming its lessons by id; lessons
//! and items live in objects keyed by id rather than in arrays.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::raw::{RawItem, RawLesson, RawModule, decode, require, scoped_id};
use super::{SchemaAdapter, SchemaVariant, Syllabus, SyllabusError};

const VARIANT: SchemaVariant = SchemaVariant::FlatWeeks;

/// Adapter for the flat per-week document shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatWeeksAdapter;

impl SchemaAdapter for FlatWeeksAdapter {
    fn variant(&self) -> SchemaVariant {
        VARIANT
    }

    fn adapt(&self, document: &Value, id_scope: &str) -> Result<Syllabus, SyllabusError> {
        let weeks: Vec<RawModule> = decode(VARIANT, "weeks", require(VARIANT, document, "weeks")?)?;
        let mut lessons: HashMap<String, RawLesson> =
            decode(VARIANT, "lessons", require(VARIANT, document, "lessons")?)?;
        let mut items: HashMap<String, RawItem> =
            decode(VARIANT, "items", require(VARIANT, document, "items")?)?;

        let mut modules = Vec::with_capacity(weeks.len());
        for (position, week) in weeks.into_iter().enumerate() {
            let fallback_id = scoped_id(id_scope, &format!("week-{}", position + 1));
            let mut lesson_records = Vec::with_capacity(week.lesson_ids.len());
            for lesson_id in &week.lesson_ids {
                let Some(lesson) = lessons.remove(lesson_id) else {
                    debug!(lesson_id = %lesson_id, "Week references unknown lesson; skipping");
                    continue;
                };
                let item_records = lesson
                    .item_ids
                    .iter()
                    .filter_map(|item_id| {
                        items
                            .remove(item_id)
                            .map(|item| item.into_record(item_id))
                    })
                    .collect();
                lesson_records.push(lesson.into_record(lesson_id, item_records));
            }
            modules.push(week.into_record(&fallback_id, lesson_records));
        }

        Ok(Syllabus { modules })
    }
}
