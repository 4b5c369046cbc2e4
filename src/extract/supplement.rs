//! Markup-backed content: supplements, course references, and the shared CML path.

use std::collections::HashMap;

use serde_json::Value;

use super::cml::{asset_tags, image_asset_ids, resource_hrefs};
use super::{ExtractError, LinkExtractor, LinkMap, pointer};

/// Wrapper key of reference content in reference documents.
const REFERENCE_CONTENT_KEY: &str = "org.coursera.ondemand.reference.ReferenceContent";

impl LinkExtractor {
    pub(super) async fn extract_supplement(&self, item_id: &str) -> Result<LinkMap, ExtractError> {
        let document = self
            .get(&self.endpoints.supplement(&self.course.course_id, item_id))
            .await?;
        let assets = pointer(&document, &["linked", "openCourseAssets.v1"])
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractError::missing("supplement", "linked.openCourseAssets.v1"))?;

        let mut links = LinkMap::new();
        for asset in assets {
            if let Some(cml) = pointer(asset, &["definition", "value"]).and_then(Value::as_str) {
                links.merge(self.links_from_cml(cml, "instructions").await?);
            }
        }
        Ok(links)
    }

    pub(super) async fn extract_reference_links(&self, short_id: &str) -> Result<LinkMap, ExtractError> {
        let document = self
            .get(&self.endpoints.reference(&self.course.course_id, short_id))
            .await?;
        let element = pointer(&document, &["elements", "0"])
            .ok_or_else(|| ExtractError::missing("reference", "elements[0]"))?;
        let cml = pointer(element, &["content", REFERENCE_CONTENT_KEY, "value"])
            .or_else(|| pointer(element, &["content", "definition", "value"]))
            .and_then(Value::as_str)
            .ok_or_else(|| ExtractError::missing("reference", "content.value"))?;
        let title = element
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(short_id);

        self.links_from_cml(cml, title).await
    }

    /// Links from one markup fragment: referenced assets, resource hrefs, and
    /// the rendered page itself under `html`.
    pub(crate) async fn links_from_cml(&self, cml: &str, title: &str) -> Result<LinkMap, ExtractError> {
        let tags = asset_tags(cml);
        let mut ids: Vec<String> = tags.iter().map(|tag| tag.id.clone()).collect();
        for id in image_asset_ids(cml) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        let resolved = self.resolve_assets(&ids).await?;
        let urls: HashMap<String, String> = resolved
            .iter()
            .map(|asset| (asset.id.clone(), asset.url.clone()))
            .collect();

        let mut links = LinkMap::new();
        for tag in &tags {
            let Some(asset) = resolved.iter().find(|asset| asset.id == tag.id) else {
                continue;
            };
            let extension = if tag.extension.is_empty() {
                asset.extension.as_str()
            } else {
                tag.extension.as_str()
            };
            let name = if tag.name.is_empty() { &asset.name } else { &tag.name };
            links.insert(extension, asset.url.clone(), name.as_str());
        }
        for (url, extension) in resource_hrefs(cml) {
            links.insert(&extension, url, "");
        }
        links.insert_in_memory_html(&self.renderer.render(cml, &urls), title);
        Ok(links)
    }
}
