//! Shared fixtures for integration tests: a scripted platform and syllabus builders.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use coursedl_core::{PlatformTransport, TransportError};
use serde_json::{Value, json};

/// In-process platform answering by URL fragment, first registered match wins.
#[derive(Default)]
pub struct FakePlatform {
    routes: Mutex<Vec<(String, Result<Value, TransportError>)>>,
    requests: Mutex<Vec<String>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, fragment: &str, response: Value) -> Self {
        self.routes
            .lock()
            .expect("routes lock")
            .push((fragment.to_string(), Ok(response)));
        self
    }

    pub fn fail(self, fragment: &str, status: u16) -> Self {
        self.routes
            .lock()
            .expect("routes lock")
            .push((fragment.to_string(), Err(TransportError::status(fragment, status))));
        self
    }

    /// Number of requests whose URL contains `fragment`.
    pub fn count(&self, fragment: &str) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }

    fn answer(&self, url: &str) -> Result<Value, TransportError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(url.to_string());
        self.routes
            .lock()
            .expect("routes lock")
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Err(TransportError::status(url, 404)))
    }
}

#[async_trait]
impl PlatformTransport for FakePlatform {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.answer(url)
    }

    async fn post_json(&self, url: &str, _body: &Value) -> Result<Value, TransportError> {
        self.answer(url)
    }
}

/// `(item id, type tag)`; the id doubles as name and slug.
pub type ItemShape<'a> = (&'a str, &'a str);
/// `(lesson id, items)`.
pub type LessonShape<'a> = (&'a str, Vec<ItemShape<'a>>);
/// `(module id, lessons)`.
pub type ModuleShape<'a> = (&'a str, Vec<LessonShape<'a>>);

/// Builds an `onDemandCourseMaterials.v2` document from a module outline.
pub fn linked_syllabus(modules: &[ModuleShape<'_>]) -> Value {
    let mut module_rows = Vec::new();
    let mut lesson_rows = Vec::new();
    let mut item_rows = Vec::new();
    for (module_id, lessons) in modules {
        let lesson_ids: Vec<&str> = lessons.iter().map(|(id, _)| *id).collect();
        module_rows.push(json!({"id": module_id, "name": module_id, "slug": module_id, "lessonIds": lesson_ids}));
        for (lesson_id, items) in lessons {
            let item_ids: Vec<&str> = items.iter().map(|(id, _)| *id).collect();
            lesson_rows.push(json!({"id": lesson_id, "name": lesson_id, "slug": lesson_id, "itemIds": item_ids}));
            for (item_id, type_name) in items {
                item_rows.push(json!({
                    "id": item_id, "name": item_id, "slug": item_id,
                    "contentSummary": {"typeName": type_name}
                }));
            }
        }
    }
    let module_ids: Vec<&str> = modules.iter().map(|(id, _)| *id).collect();
    json!({
        "elements": [{"id": "C1", "moduleIds": module_ids}],
        "linked": {
            "onDemandCourseMaterialModules.v1": module_rows,
            "onDemandCourseMaterialLessons.v1": lesson_rows,
            "onDemandCourseMaterialItems.v2": item_rows
        }
    })
}

/// Builds the equivalent `onDemandCourseWeeks.v1` document.
pub fn weeks_syllabus(modules: &[ModuleShape<'_>]) -> Value {
    let mut weeks = Vec::new();
    let mut lessons = serde_json::Map::new();
    let mut items = serde_json::Map::new();
    for (module_id, module_lessons) in modules {
        let lesson_ids: Vec<&str> = module_lessons.iter().map(|(id, _)| *id).collect();
        weeks.push(json!({"id": module_id, "name": module_id, "slug": module_id, "lessonIds": lesson_ids}));
        for (lesson_id, lesson_items) in module_lessons {
            let item_ids: Vec<&str> = lesson_items.iter().map(|(id, _)| *id).collect();
            lessons.insert(
                (*lesson_id).to_string(),
                json!({"name": lesson_id, "slug": lesson_id, "itemIds": item_ids}),
            );
            for (item_id, type_name) in lesson_items {
                items.insert(
                    (*item_id).to_string(),
                    json!({"name": item_id, "slug": item_id, "typeName": type_name}),
                );
            }
        }
    }
    json!({"weeks": weeks, "lessons": lessons, "items": items})
}

/// Builds the equivalent nested `opencourse.v1` course-material document.
pub fn material_syllabus(modules: &[ModuleShape<'_>]) -> Value {
    let elements: Vec<Value> = modules
        .iter()
        .map(|(module_id, lessons)| {
            let lessons: Vec<Value> = lessons
                .iter()
                .map(|(lesson_id, items)| {
                    let items: Vec<Value> = items
                        .iter()
                        .map(|(item_id, type_name)| {
                            json!({
                                "id": item_id, "name": item_id, "slug": item_id,
                                "content": {"typeName": type_name, "definition": {}}
                            })
                        })
                        .collect();
                    json!({"id": lesson_id, "name": lesson_id, "slug": lesson_id, "elements": items})
                })
                .collect();
            json!({"id": module_id, "name": module_id, "slug": module_id, "elements": lessons})
        })
        .collect();
    json!({"courseMaterial": {"elements": elements}})
}

/// Course lookup answer for course `C1`.
pub fn course_lookup() -> Value {
    json!({"elements": [{"id": "C1", "name": "Machine Learning", "slug": "ml"}]})
}

/// Supplement answer with a small markup page and no assets.
pub fn supplement_page(text: &str) -> Value {
    json!({"linked": {"openCourseAssets.v1": [
        {"typeName": "cml", "definition": {"value": format!("<co-content><text>{text}</text></co-content>")}}
    ]}})
}

/// Platform answering the course bootstrap and the given linked syllabus.
pub fn platform_with_syllabus(syllabus: Value) -> FakePlatform {
    FakePlatform::new()
        .route("onDemandCourses.v1", course_lookup())
        .route("onDemandCourseMaterials.v2", syllabus)
        .route("adminUserPermissions.v1", json!({"elements": [{"id": 77}]}))
}
