//! Asset id resolution through `assets.v1`.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::links::url_extension;
use super::{ExtractError, LinkExtractor};

/// A course asset with a download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub id: String,
    pub name: String,
    /// Lowercase file extension, `bin` when none can be determined.
    pub extension: String,
    pub url: String,
    /// Platform asset type (`asset`, `url`, ...).
    pub asset_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAsset {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    file_extension: Option<String>,
    #[serde(default)]
    type_name: Option<String>,
    #[serde(default)]
    url: Option<Value>,
}

impl RawAsset {
    fn download_url(&self) -> Option<String> {
        match self.url.as_ref()? {
            Value::String(url) => Some(url.trim().to_string()),
            Value::Object(fields) => fields
                .get("url")
                .and_then(Value::as_str)
                .map(|url| url.trim().to_string()),
            _ => None,
        }
    }
}

impl LinkExtractor {
    /// Resolves `asset_ids` in one request. Ids the platform does not return
    /// or that carry no URL are skipped.
    pub(crate) async fn resolve_assets(
        &self,
        asset_ids: &[String],
    ) -> Result<Vec<ResolvedAsset>, ExtractError> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }
        let document = self.get(&self.endpoints.assets(asset_ids)).await?;
        let elements = document
            .get("elements")
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractError::missing("assets", "elements"))?;

        let mut resolved = Vec::with_capacity(elements.len());
        for element in elements {
            let Ok(raw) = serde_json::from_value::<RawAsset>(element.clone()) else {
                debug!("Skipping asset element without an id");
                continue;
            };
            let Some(url) = raw.download_url() else {
                debug!(asset = %raw.id, "Skipping asset without a URL");
                continue;
            };
            let extension = raw
                .file_extension
                .as_deref()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .or_else(|| raw.name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()))
                .or_else(|| url_extension(&url))
                .unwrap_or_else(|| "bin".to_string());
            resolved.push(ResolvedAsset {
                id: raw.id,
                name: raw.name,
                extension,
                url,
                asset_type: raw.type_name.unwrap_or_else(|| "asset".to_string()),
            });
        }
        Ok(resolved)
    }
}
