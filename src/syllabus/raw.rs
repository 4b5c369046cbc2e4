//! Serde shapes shared by the schema adapters.
//!
//! All three document shapes describe modules, lessons, and items with
//! overlapping field sets; these structs accept the union and convert into
//! the variant-independent records.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{ItemRecord, LessonRecord, ModuleRecord, SchemaVariant, SyllabusError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawModule {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lesson_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawLesson {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub item_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawContent {
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub definition: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub lesson_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub content_summary: Option<RawContent>,
    #[serde(default)]
    pub content: Option<RawContent>,
}

/// Decodes `value` (found under `key`) into `T`, mapping failures to `MalformedDocument`.
pub(super) fn decode<T: DeserializeOwned>(
    variant: SchemaVariant,
    key: &str,
    value: &Value,
) -> Result<T, SyllabusError> {
    serde_json::from_value(value.clone()).map_err(|e| SyllabusError::invalid_key(variant, key, e))
}

/// Looks up a required key on a JSON object.
pub(super) fn require<'a>(
    variant: SchemaVariant,
    parent: &'a Value,
    key: &str,
) -> Result<&'a Value, SyllabusError> {
    parent
        .get(key)
        .ok_or_else(|| SyllabusError::missing_key(variant, key))
}

/// Positional id for a record without one, unique per course.
pub(super) fn scoped_id(id_scope: &str, position: &str) -> String {
    format!("{id_scope}:{position}")
}

fn slug_or_name(slug: Option<String>, name: &str) -> String {
    slug.filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| name.to_string())
}

impl RawModule {
    pub(super) fn into_record(self, fallback_id: &str, lessons: Vec<LessonRecord>) -> ModuleRecord {
        let name = self.name.unwrap_or_default();
        ModuleRecord {
            id: self.id.unwrap_or_else(|| fallback_id.to_string()),
            slug: slug_or_name(self.slug, &name),
            name,
            description: self.description.unwrap_or_default(),
            lessons,
        }
    }
}

impl RawLesson {
    pub(super) fn into_record(self, fallback_id: &str, items: Vec<ItemRecord>) -> LessonRecord {
        let name = self.name.unwrap_or_default();
        LessonRecord {
            id: self.id.unwrap_or_else(|| fallback_id.to_string()),
            slug: slug_or_name(self.slug, &name),
            name,
            items,
        }
    }
}

impl RawItem {
    pub(super) fn into_record(self, fallback_id: &str) -> ItemRecord {
        let name = self.name.unwrap_or_default();
        let content = self.content.or(self.content_summary);
        let type_name = self
            .type_name
            .or_else(|| content.as_ref().and_then(|c| c.type_name.clone()))
            .unwrap_or_default();
        let definition = content.and_then(|c| c.definition);

        let video_id = definition
            .as_ref()
            .and_then(|d| d.get("videoId"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let asset_ids = definition
            .as_ref()
            .and_then(|d| d.get("assets"))
            .and_then(Value::as_array)
            .map(|assets| assets.iter().filter_map(asset_id).collect())
            .unwrap_or_default();

        ItemRecord {
            id: self.id.unwrap_or_else(|| fallback_id.to_string()),
            slug: slug_or_name(self.slug, &name),
            name,
            type_name,
            video_id,
            asset_ids,
        }
    }
}

fn asset_id(asset: &Value) -> Option<String> {
    match asset {
        Value::String(id) => Some(id.clone()),
        Value::Object(fields) => fields.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
