//! Type-dispatched link extraction for syllabus items.
//!
//! [`LinkExtractor::extract`] maps one [`ItemRecord`] to an [`ExtractOutcome`]
//! by its content-type tag. Each content type has its own routine; tags outside
//! the known vocabulary are skipped without error.
//!
//! Quiz-like types run only with `download_quizzes`. Notebook items run only
//! with `download_notebooks` and only once per extractor, because launching a
//! notebook workspace has side effects on the platform.

mod assets;
mod assignment;
pub mod cml;
mod content_type;
mod error;
mod lecture;
mod links;
mod notebook;
mod quiz;
mod supplement;

pub use assets::ResolvedAsset;
pub use content_type::ContentType;
pub use error::ExtractError;
pub use lecture::ResolvedVideo;
pub use links::{IN_MEMORY_MARKER, Link, LinkMap, url_extension};

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::ExtractionPolicy;
use crate::platform::{Endpoints, PlatformTransport};
use crate::syllabus::ItemRecord;

use cml::HtmlRenderer;

/// Course identity the extraction routines need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseContext {
    /// Platform course id.
    pub course_id: String,
    /// Class name (course slug) used in URLs.
    pub class_name: String,
    /// Learner id; required by peer and quiz items.
    pub user_id: Option<String>,
}

/// Result of extracting a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// At least one link was found.
    Links(LinkMap),
    /// Recognized and attempted, nothing to download.
    NoContent,
    /// Not attempted: unknown type or disabled by policy.
    Skipped(SkipReason),
    /// The routine failed; the run continues.
    Failed(ExtractError),
}

impl ExtractOutcome {
    /// True when this outcome should raise the run-level error flag.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the links if any were extracted.
    #[must_use]
    pub fn into_links(self) -> Option<LinkMap> {
        match self {
            Self::Links(links) => Some(links),
            Self::NoContent | Self::Skipped(_) | Self::Failed(_) => None,
        }
    }

    fn from_result(result: Result<LinkMap, ExtractError>) -> Self {
        match result {
            Ok(links) if links.is_empty() => Self::NoContent,
            Ok(links) => Self::Links(links),
            Err(error) => Self::Failed(error),
        }
    }
}

/// Why an item was not attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Tag outside the known vocabulary.
    UnsupportedType(String),
    /// Quiz, exam, or immediate programming item with quizzes disabled.
    QuizzesDisabled,
    /// Notebook item with notebooks disabled.
    NotebooksDisabled,
}

/// Extracts resource links for the items of one course.
///
/// Holds the run-scoped notebook guard, so one extractor serves exactly one run.
pub struct LinkExtractor {
    transport: Arc<dyn PlatformTransport>,
    endpoints: Endpoints,
    course: CourseContext,
    policy: ExtractionPolicy,
    renderer: HtmlRenderer,
    notebook_extracted: bool,
    resolved_assets: Vec<ResolvedAsset>,
    resolved_video: Option<ResolvedVideo>,
}

impl LinkExtractor {
    #[must_use]
    pub fn new(
        transport: Arc<dyn PlatformTransport>,
        endpoints: Endpoints,
        course: CourseContext,
        policy: ExtractionPolicy,
    ) -> Self {
        let renderer = HtmlRenderer::new(policy.mathjax_cdn_url.as_deref());
        Self {
            transport,
            endpoints,
            course,
            policy,
            renderer,
            notebook_extracted: false,
            resolved_assets: Vec::new(),
            resolved_video: None,
        }
    }

    /// Whether a notebook item has already been attempted by this extractor.
    #[must_use]
    pub fn notebook_extracted(&self) -> bool {
        self.notebook_extracted
    }

    /// Takes the lecture assets resolved since the last call, for persistence.
    pub fn take_resolved_assets(&mut self) -> Vec<ResolvedAsset> {
        std::mem::take(&mut self.resolved_assets)
    }

    /// Takes the video of the last lecture extracted, if it had one.
    pub fn take_resolved_video(&mut self) -> Option<ResolvedVideo> {
        self.resolved_video.take()
    }

    /// Extracts the links of `item` according to its content type and the policy.
    #[instrument(skip(self, item), fields(item = %item.slug, type_name = %item.type_name))]
    pub async fn extract(&mut self, item: &ItemRecord) -> ExtractOutcome {
        let content_type = ContentType::from_tag(&item.type_name);

        if content_type.is_quiz_gated() && !self.policy.download_quizzes {
            debug!("Quiz extraction disabled; skipping");
            return ExtractOutcome::Skipped(SkipReason::QuizzesDisabled);
        }

        let result = match &content_type {
            ContentType::Lecture => self.extract_lecture(item).await,
            ContentType::Supplement => self.extract_supplement(&item.id).await,
            ContentType::PhasedPeer => self.extract_peer_assignment(&item.id).await,
            ContentType::GradedProgramming | ContentType::UngradedProgramming => {
                self.extract_programming(&item.id).await
            }
            ContentType::Quiz => self.extract_quiz(&item.id).await,
            ContentType::Exam => self.extract_exam(&item.id).await,
            ContentType::Programming => self.extract_programming_immediate(&item.id).await,
            ContentType::Notebook => {
                if !self.policy.download_notebooks {
                    debug!("Notebook extraction disabled; skipping");
                    return ExtractOutcome::Skipped(SkipReason::NotebooksDisabled);
                }
                if self.notebook_extracted {
                    debug!("A notebook was already extracted in this run");
                    return ExtractOutcome::NoContent;
                }
                warn!("Launching the notebook workspace; the platform prepares its content on first access");
                self.notebook_extracted = true;
                self.extract_notebook(&item.id).await
            }
            ContentType::Unsupported(tag) => {
                info!(item_id = %item.id, "Unsupported type name \"{tag}\"");
                return ExtractOutcome::Skipped(SkipReason::UnsupportedType(tag.clone()));
            }
        };

        if let Err(error) = &result {
            warn!(error = %error, "Item extraction failed");
        }
        ExtractOutcome::from_result(result)
    }

    /// Extracts a course-level reference by its short id.
    #[instrument(skip(self))]
    pub async fn extract_reference(&self, short_id: &str) -> ExtractOutcome {
        let result = self.extract_reference_links(short_id).await;
        if let Err(error) = &result {
            warn!(error = %error, "Reference extraction failed");
        }
        ExtractOutcome::from_result(result)
    }

    pub(crate) async fn get(&self, url: &str) -> Result<Value, ExtractError> {
        Ok(self.transport.get_json(url).await?)
    }

    pub(crate) async fn post(&self, url: &str, body: &Value) -> Result<Value, ExtractError> {
        Ok(self.transport.post_json(url, body).await?)
    }

    pub(crate) fn user_id(&self) -> Result<&str, ExtractError> {
        self.course
            .user_id
            .as_deref()
            .ok_or(ExtractError::MissingUserId)
    }
}

/// Walks `path` through nested objects; numeric segments index arrays.
///
/// Segments are whole keys, so table names such as `onDemandVideos.v1` work.
pub(crate) fn pointer<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => current.get(*segment),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::platform::TransportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Canned responses keyed by URL path prefix; records every request.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        responses: Mutex<Vec<(String, Result<Value, TransportError>)>>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub(crate) fn respond(self, fragment: &str, value: Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push((fragment.to_string(), Ok(value)));
            self
        }

        pub(crate) fn fail(self, fragment: &str, status: u16) -> Self {
            self.responses.lock().unwrap().push((
                fragment.to_string(),
                Err(TransportError::status(fragment, status)),
            ));
            self
        }

        fn answer(&self, url: &str) -> Result<Value, TransportError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .iter()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .map(|(_, answer)| answer.clone())
                .unwrap_or_else(|| Err(TransportError::status(url, 404)))
        }
    }

    #[async_trait]
    impl PlatformTransport for ScriptedTransport {
        async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
            self.answer(url)
        }

        async fn post_json(&self, url: &str, _body: &Value) -> Result<Value, TransportError> {
            self.answer(url)
        }
    }

    pub(crate) fn extractor(transport: ScriptedTransport, policy: ExtractionPolicy) -> LinkExtractor {
        LinkExtractor::new(
            Arc::new(transport),
            Endpoints::new("http://api", "http://hub"),
            CourseContext {
                course_id: "C1".to_string(),
                class_name: "ml".to_string(),
                user_id: Some("77".to_string()),
            },
            policy,
        )
    }

    pub(crate) fn item(id: &str, type_name: &str) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            name: id.to_string(),
            slug: id.to_string(),
            type_name: type_name.to_string(),
            video_id: None,
            asset_ids: Vec::new(),
        }
    }

    fn notebook_transport() -> ScriptedTransport {
        ScriptedTransport::default()
            .respond(
                "onDemandNotebookWorkspaceLaunches.v1",
                json!({"elements": [{"authorizationId": "auth1", "contentPath": "/work"}]}),
            )
            .respond(
                "/user/auth1/api/contents/work",
                json!({"type": "directory", "content": [{"type": "file", "path": "work/a.ipynb", "name": "a.ipynb"}]}),
            )
    }

    #[tokio::test]
    async fn test_unsupported_type_is_skipped_not_failed() {
        let mut extractor = extractor(ScriptedTransport::default(), ExtractionPolicy::default());
        let outcome = extractor.extract(&item("x", "discussionPrompt")).await;
        assert_eq!(
            outcome,
            ExtractOutcome::Skipped(SkipReason::UnsupportedType("discussionPrompt".to_string()))
        );
        assert!(!outcome.is_failure());
    }

    #[tokio::test]
    async fn test_quiz_types_need_policy_flag() {
        let mut extractor = extractor(ScriptedTransport::default(), ExtractionPolicy::default());
        for tag in ["quiz", "exam", "programming"] {
            let outcome = extractor.extract(&item("q", tag)).await;
            assert_eq!(outcome, ExtractOutcome::Skipped(SkipReason::QuizzesDisabled));
        }
    }

    #[tokio::test]
    async fn test_notebook_one_shot_guard() {
        let policy = ExtractionPolicy {
            download_notebooks: true,
            ..ExtractionPolicy::default()
        };
        let mut extractor = extractor(notebook_transport(), policy);

        let first = extractor.extract(&item("n1", "notebook")).await;
        let second = extractor.extract(&item("n2", "notebook")).await;

        let links = first.into_links().unwrap();
        assert_eq!(
            links.get("ipynb").unwrap()[0].url,
            "http://hub/user/auth1/files/work/a.ipynb"
        );
        assert_eq!(second, ExtractOutcome::NoContent);
        assert!(extractor.notebook_extracted());
    }

    #[tokio::test]
    async fn test_notebook_disabled_does_not_trip_guard() {
        let mut extractor = extractor(notebook_transport(), ExtractionPolicy::default());
        let outcome = extractor.extract(&item("n1", "notebook")).await;
        assert_eq!(outcome, ExtractOutcome::Skipped(SkipReason::NotebooksDisabled));
        assert!(!extractor.notebook_extracted());
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_failed_outcome() {
        let transport = ScriptedTransport::default().fail("onDemandSupplements.v1", 500);
        let mut extractor = extractor(transport, ExtractionPolicy::default());
        let outcome = extractor.extract(&item("s1", "supplement")).await;
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_pointer_walks_objects_and_arrays() {
        let value = json!({"linked": {"v": [{"id": "a"}, {"id": "b"}]}});
        assert_eq!(pointer(&value, &["linked", "v", "1", "id"]), Some(&json!("b")));
        assert_eq!(pointer(&value, &["linked", "missing"]), None);

        let table = json!({"linked": {"onDemandVideos.v1": [{"id": "v"}]}});
        assert_eq!(pointer(&table, &["linked", "onDemandVideos.v1", "0", "id"]), Some(&json!("v")));
    }
}
