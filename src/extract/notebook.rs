//! Notebook workspaces: launch once, then list every file in the hub.

use serde_json::{Value, json};
use tracing::debug;

use super::links::url_extension;
use super::{ExtractError, LinkExtractor, LinkMap, pointer};

/// Directory levels walked below the workspace root.
const MAX_NOTEBOOK_DEPTH: usize = 8;

impl LinkExtractor {
    pub(super) async fn extract_notebook(&self, item_id: &str) -> Result<LinkMap, ExtractError> {
        let user_id = self.user_id()?;
        let body = json!({
            "courseId": self.course.course_id,
            "learnerId": user_id,
            "itemId": item_id,
        });
        let launch = self.post(&self.endpoints.notebook_launch(), &body).await?;
        let element = pointer(&launch, &["elements", "0"])
            .ok_or_else(|| ExtractError::missing("notebook launch", "elements[0]"))?;
        let authorization_id = element
            .get("authorizationId")
            .and_then(Value::as_str)
            .ok_or_else(|| ExtractError::missing("notebook launch", "authorizationId"))?;
        let root = element
            .get("contentPath")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut links = LinkMap::new();
        let mut pending = vec![(root.trim_matches('/').to_string(), 0_usize)];
        while let Some((path, depth)) = pending.pop() {
            let listing = self
                .get(&self.endpoints.notebook_contents(authorization_id, &path))
                .await?;
            let entries = listing
                .get("content")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            for entry in entries {
                let Some(entry_path) = entry.get("path").and_then(Value::as_str) else {
                    continue;
                };
                match entry.get("type").and_then(Value::as_str) {
                    Some("directory") if depth < MAX_NOTEBOOK_DEPTH => {
                        pending.push((entry_path.to_string(), depth + 1));
                    }
                    Some("directory") => debug!(path = entry_path, "Notebook tree too deep; skipping"),
                    kind => {
                        let name = entry
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or(entry_path);
                        let extension = url_extension(name).unwrap_or_else(|| match kind {
                            Some("notebook") => "ipynb".to_string(),
                            _ => "file".to_string(),
                        });
                        let title = name
                            .rsplit_once('.')
                            .map_or(name, |(stem, _)| stem);
                        links.insert(
                            &extension,
                            self.endpoints.notebook_file(authorization_id, entry_path),
                            title,
                        );
                    }
                }
            }
        }
        Ok(links)
    }
}
