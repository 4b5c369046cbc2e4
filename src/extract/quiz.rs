//! Quiz and exam pages, fetched through a session and rendered to HTML.

use serde_json::{Value, json};

use super::{ExtractError, LinkExtractor, LinkMap, pointer};

impl LinkExtractor {
    pub(super) async fn extract_quiz(&self, item_id: &str) -> Result<LinkMap, ExtractError> {
        let user_id = self.user_id()?;
        let class_name = &self.course.class_name;

        let session_url = self.endpoints.quiz_session(user_id, class_name, item_id);
        let body = json!({"contentRequestBody": {"argument": {
            "courseId": self.course.course_id,
            "itemId": item_id,
        }}});
        let session = self.post(&session_url, &body).await?;
        let session_id = pointer(&session, &["contentResponseBody", "session", "id"])
            .and_then(Value::as_str)
            .ok_or_else(|| ExtractError::missing("quiz session", "contentResponseBody.session.id"))?;

        let state_url = self
            .endpoints
            .quiz_state(user_id, class_name, item_id, session_id);
        let state = self
            .post(&state_url, &json!({"contentRequestBody": {"argument": []}}))
            .await?;
        let questions = pointer(&state, &["contentResponseBody", "return", "questions"])
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractError::missing("quiz state", "contentResponseBody.return.questions"))?;

        self.questions_page(questions, "quiz").await
    }

    pub(super) async fn extract_exam(&self, item_id: &str) -> Result<LinkMap, ExtractError> {
        let body = json!({"courseId": self.course.course_id, "itemId": item_id});
        let session = self.post(&self.endpoints.exam_sessions(), &body).await?;
        let session_id = pointer(&session, &["elements", "0", "id"])
            .and_then(Value::as_str)
            .ok_or_else(|| ExtractError::missing("exam session", "elements[0].id"))?;

        let state = self
            .post(
                &self.endpoints.exam_state(session_id),
                &json!({"name": "getState", "argument": []}),
            )
            .await?;
        let questions = pointer(&state, &["elements", "0", "result", "questions"])
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractError::missing("exam state", "elements[0].result.questions"))?;

        self.questions_page(questions, "exam").await
    }

    async fn questions_page(&self, questions: &[Value], title: &str) -> Result<LinkMap, ExtractError> {
        if questions.is_empty() {
            return Ok(LinkMap::new());
        }
        let markup = questions_markup(questions);
        self.links_from_cml(&markup, title).await
    }
}

/// Numbered questions with their prompt and option list.
fn questions_markup(questions: &[Value]) -> String {
    let mut markup = String::new();
    for (index, question) in questions.iter().enumerate() {
        markup.push_str(&format!(r#"<heading level="3">Question {}</heading>"#, index + 1));
        if let Some(prompt) = pointer(question, &["variant", "definition", "prompt", "definition", "value"])
            .and_then(Value::as_str)
        {
            markup.push_str(prompt);
        }
        let options = pointer(question, &["variant", "definition", "options"])
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if options.is_empty() {
            continue;
        }
        markup.push_str(r#"<list bulletType="bullets">"#);
        for option in options {
            let display = pointer(option, &["display", "definition", "value"])
                .and_then(Value::as_str)
                .unwrap_or_default();
            markup.push_str(&format!("<li>{display}</li>"));
        }
        markup.push_str("</list>");
    }
    markup
}
