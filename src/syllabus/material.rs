//! Nested course-material syllabus (`opencourse.v1/course/<slug>`).
//!
//! The only physically nested shape: `courseMaterial.elements` holds modules,
//! each module's `elements` holds lessons, and each lesson's `elements`
//! holds items with their full `content.definition`.

use serde::Deserialize;
use serde_json::Value;

use super::raw::{RawItem, RawLesson, RawModule, decode, require, scoped_id};
use super::{SchemaAdapter, SchemaVariant, Syllabus, SyllabusError};

const VARIANT: SchemaVariant = SchemaVariant::CourseMaterial;

#[derive(Debug, Deserialize)]
struct NestedModule {
    #[serde(flatten)]
    module: RawModule,
    #[serde(default)]
    elements: Vec<NestedLesson>,
}

#[derive(Debug, Deserialize)]
struct NestedLesson {
    #[serde(flatten)]
    lesson: RawLesson,
    #[serde(default)]
    elements: Vec<RawItem>,
}

/// Adapter for the nested course-material document shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct CourseMaterialAdapter;

impl SchemaAdapter for CourseMaterialAdapter {
    fn variant(&self) -> SchemaVariant {
        VARIANT
    }

    fn adapt(&self, document: &Value, id_scope: &str) -> Result<Syllabus, SyllabusError> {
        let material = require(VARIANT, document, "courseMaterial")?;
        let nested: Vec<NestedModule> = decode(
            VARIANT,
            "courseMaterial.elements",
            require(VARIANT, material, "elements")
                .map_err(|_| SyllabusError::missing_key(VARIANT, "courseMaterial.elements"))?,
        )?;

        let modules = nested
            .into_iter()
            .enumerate()
            .map(|(m, NestedModule { module, elements })| {
                let lessons = elements
                    .into_iter()
                    .enumerate()
                    .map(|(l, NestedLesson { lesson, elements })| {
                        let items = elements
                            .into_iter()
                            .enumerate()
                            .map(|(i, item)| {
                                item.into_record(&scoped_id(id_scope, &format!("{m}.{l}.{i}")))
                            })
                            .collect();
                        lesson.into_record(&scoped_id(id_scope, &format!("{m}.{l}")), items)
                    })
                    .collect();
                module.into_record(&scoped_id(id_scope, &m.to_string()), lessons)
            })
            .collect();

        Ok(Syllabus { modules })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_material_adapter_walks_nested_elements() {
        let document = json!({
            "courseMaterial": {
                "elements": [{
                    "id": "m1", "name": "Week 1", "slug": "week-1",
                    "elements": [{
                        "id": "l1", "name": "Intro", "slug": "intro",
                        "elements": [{
                            "id": "i1", "name": "Welcome", "slug": "welcome",
                            "content": {"typeName": "lecture", "definition": {"videoId": "vid-1", "assets": []}}
                        }]
                    }]
                }]
            }
        });

        let syllabus = CourseMaterialAdapter.adapt(&document, "C1").unwrap();

        let item = &syllabus.modules[0].lessons[0].items[0];
        assert_eq!(item.id, "i1");
        assert_eq!(item.type_name, "lecture");
        assert_eq!(item.video_id.as_deref(), Some("vid-1"));
    }

    #[test]
    fn test_material_adapter_lesson_without_elements_is_empty() {
        let document = json!({
            "courseMaterial": {
                "elements": [{"id": "m1", "name": "Week 1", "elements": [{"id": "l1", "name": "Quiz time"}]}]
            }
        });

        let syllabus = CourseMaterialAdapter.adapt(&document, "C1").unwrap();
        assert!(syllabus.modules[0].lessons[0].items.is_empty());
    }

    #[test]
    fn test_material_adapter_scopes_positional_ids() {
        let document = json!({
            "courseMaterial": {
                "elements": [{"name": "Week 1", "elements": [{"name": "Intro", "elements": [{"name": "Welcome"}]}]}]
            }
        });

        let syllabus = CourseMaterialAdapter.adapt(&document, "C9").unwrap();

        let module = &syllabus.modules[0];
        assert_eq!(module.id, "C9:0");
        assert_eq!(module.lessons[0].id, "C9:0.0");
        assert_eq!(module.lessons[0].items[0].id, "C9:0.0.0");
    }

    #[test]
    fn test_material_adapter_missing_root_is_malformed() {
        let err = CourseMaterialAdapter.adapt(&json!({"elements": []}), "C1").unwrap_err();
        assert_eq!(err, SyllabusError::missing_key(VARIANT, "courseMaterial"));
    }

    #[test]
    fn test_material_adapter_missing_elements_is_malformed() {
        let err = CourseMaterialAdapter
            .adapt(&json!({"courseMaterial": {}}), "C1")
            .unwrap_err();
        assert_eq!(
            err,
            SyllabusError::missing_key(VARIANT, "courseMaterial.elements")
        );
    }
}
