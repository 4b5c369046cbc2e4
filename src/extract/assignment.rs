//! Peer-review and programming assignment instructions.

use serde_json::Value;

use super::{ExtractError, LinkExtractor, LinkMap, pointer};

impl LinkExtractor {
    pub(super) async fn extract_peer_assignment(&self, item_id: &str) -> Result<LinkMap, ExtractError> {
        let user_id = self.user_id()?;
        let document = self
            .get(&self.endpoints.peer_instructions(&self.course.course_id, item_id, user_id))
            .await?;
        let instructions = pointer(&document, &["elements", "0", "instructions"])
            .ok_or_else(|| ExtractError::missing("peer instructions", "elements[0].instructions"))?;

        let mut cml = pointer(instructions, &["introduction", "definition", "value"])
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let sections = instructions
            .get("sections")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for section in sections {
            if let Some(title) = section.get("title").and_then(Value::as_str) {
                cml.push_str(&format!(r#"<heading level="3">{title}</heading>"#));
            }
            if let Some(body) = pointer(section, &["content", "definition", "value"]).and_then(Value::as_str) {
                cml.push_str(body);
            }
        }

        if cml.trim().is_empty() {
            return Ok(LinkMap::new());
        }
        self.links_from_cml(&cml, "peer_assignment_instructions").await
    }

    pub(super) async fn extract_programming(&self, item_id: &str) -> Result<LinkMap, ExtractError> {
        let document = self
            .get(&self.endpoints.programming_assignment(&self.course.course_id, item_id))
            .await?;
        let cml = pointer(
            &document,
            &[
                "elements",
                "0",
                "submissionLearnerSchema",
                "definition",
                "assignmentInstructions",
                "definition",
                "value",
            ],
        )
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ExtractError::missing("programming assignment", "submissionLearnerSchema.assignmentInstructions")
        })?;

        self.links_from_cml(cml, "programming_instructions").await
    }

    pub(super) async fn extract_programming_immediate(&self, item_id: &str) -> Result<LinkMap, ExtractError> {
        let document = self
            .get(
                &self
                    .endpoints
                    .programming_immediate_instructions(&self.course.course_id, item_id),
            )
            .await?;
        let cml = pointer(
            &document,
            &["elements", "0", "assignmentInstructions", "definition", "value"],
        )
        .and_then(Value::as_str)
        .ok_or_else(|| ExtractError::missing("programming instructions", "assignmentInstructions"))?;

        self.links_from_cml(cml, "programming_immediate_instructions").await
    }
}
