//! Course run orchestration.
//!
//! [`CourseExtractor::get_modules`] drives one course through
//! fetch → adapt → normalize → persist + extract, one item at a time in
//! document order, and returns `(error_occurred, tree)`. Only malformed
//! syllabi and catalog failures abort the run; a failed item just raises the
//! flag and is left out of the tree.

mod error;
mod tree;

pub use error::RunError;
pub use tree::{CourseTree, ItemLinks, LessonSection, ModuleSection, RESOURCES_MODULE};

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::catalog::{
    CatalogRepository, CourseRow, ItemRow, NewCourse, NewCourseAsset, NewItem, NewLesson,
    NewModule, NewReference, NewVideoAsset,
};
use crate::config::ExtractionPolicy;
use crate::extract::{CourseContext, ExtractOutcome, LinkExtractor};
use crate::filename::clean_filename;
use crate::platform::{Endpoints, PlatformTransport, TransportError};
use crate::syllabus::{ItemIndex, SchemaVariant, adapt, normalize};

/// Extractor for one platform account: lists courses and walks their syllabi.
pub struct CourseExtractor {
    transport: Arc<dyn PlatformTransport>,
    endpoints: Endpoints,
    catalog: Arc<dyn CatalogRepository>,
}

impl CourseExtractor {
    #[must_use]
    pub fn new(
        transport: Arc<dyn PlatformTransport>,
        endpoints: Endpoints,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            transport,
            endpoints,
            catalog,
        }
    }

    /// Slugs of the courses the session is enrolled in.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Transport`] when the memberships request fails.
    #[instrument(skip(self))]
    pub async fn list_courses(&self) -> Result<Vec<String>, RunError> {
        let document = self.transport.get_json(&self.endpoints.memberships()).await?;
        let courses = document
            .get("linked")
            .and_then(|linked| linked.get("courses.v1"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(courses
            .iter()
            .filter_map(|course| course.get("slug").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// The learner id of the session, or `None` when it cannot be obtained.
    #[instrument(skip(self))]
    pub async fn obtain_user_id(&self) -> Option<String> {
        let document = match self.transport.get_json(&self.endpoints.user_permissions()).await {
            Ok(document) => document,
            Err(error) => {
                warn!(error = %error, "Could not obtain learner id");
                return None;
            }
        };
        let id = document
            .get("elements")
            .and_then(|elements| elements.get(0))
            .and_then(|element| element.get("id"));
        match id {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => {
                warn!("Learner id missing from permissions response");
                None
            }
        }
    }

    /// Looks the class up and get-or-creates its course row.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Transport`] when the lookup fails,
    /// [`RunError::MalformedResponse`] when it has no course element, and
    /// [`RunError::Catalog`] when the row cannot be written.
    #[instrument(skip(self))]
    pub async fn create_course(&self, class_name: &str) -> Result<CourseRow, RunError> {
        let document = self.transport.get_json(&self.endpoints.course(class_name)).await?;
        let element = document
            .get("elements")
            .and_then(|elements| elements.get(0))
            .ok_or_else(|| malformed("course lookup", class_name, "elements[0]"))?;
        let course_id = element
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("course lookup", class_name, "elements[0].id"))?;
        let name = element
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(class_name);

        let row = self
            .catalog
            .get_or_create_course(&NewCourse {
                course_id,
                name,
                slug: class_name,
            })
            .await?;
        Ok(row)
    }

    /// Walks the syllabus of `class_name` and extracts every item.
    ///
    /// Returns whether any item failed, together with the tree of everything
    /// that produced links.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when no syllabus endpoint answers, the syllabus is
    /// malformed, or the catalog fails after its one schema retry.
    #[instrument(skip(self, policy))]
    pub async fn get_modules(
        &self,
        class_name: &str,
        policy: &ExtractionPolicy,
    ) -> Result<(bool, CourseTree), RunError> {
        let course = self.create_course(class_name).await?;
        let (variant, document) = self.fetch_syllabus(class_name).await?;
        let syllabus = adapt(&document, variant, &course.course_id)?;

        info!(
            course_id = %course.course_id,
            %variant,
            "Parsing syllabus of on-demand course. This may take some time, please be patient ..."
        );

        let user_id = self.obtain_user_id().await;
        let index = self.fetch_item_index(class_name).await;
        let canonical = normalize(syllabus, policy.normalize_options(), &index);

        let mut extractor = LinkExtractor::new(
            Arc::clone(&self.transport),
            self.endpoints.clone(),
            CourseContext {
                course_id: course.course_id.clone(),
                class_name: class_name.to_string(),
                user_id,
            },
            policy.clone(),
        );

        let mut error_occurred = false;
        let mut modules = Vec::new();

        for module in &canonical.modules {
            info!(module = %module.slug, "Processing module");
            let db_module = self
                .catalog
                .get_or_create_module(&NewModule {
                    module_id: &module.id,
                    course: course.id,
                    name: &module.name,
                    slug: &module.slug,
                    description: &module.description,
                })
                .await?;

            let mut lessons = Vec::new();
            for lesson in &module.lessons {
                info!(lesson = %lesson.slug, "Processing section");
                let db_lesson = self
                    .catalog
                    .get_or_create_lesson(&NewLesson {
                        lesson_id: &lesson.id,
                        module: db_module.id,
                        name: &lesson.name,
                        slug: &lesson.slug,
                    })
                    .await?;

                let mut items = Vec::new();
                for item in &lesson.items {
                    info!(item = %item.slug, type_name = %item.type_name, "Processing lecture");
                    let db_item = self
                        .catalog
                        .get_or_create_item(&NewItem {
                            item_id: &item.id,
                            lesson: db_lesson.id,
                            module: db_module.id,
                            name: &item.name,
                            slug: &item.slug,
                            type_name: &item.type_name,
                        })
                        .await?;

                    let outcome = extractor.extract(item).await;
                    self.persist_assets(&mut extractor, &db_item).await?;
                    match outcome {
                        ExtractOutcome::Links(links) => items.push(ItemLinks {
                            slug: item.slug.clone(),
                            links,
                        }),
                        ExtractOutcome::Failed(_) => error_occurred = true,
                        ExtractOutcome::NoContent | ExtractOutcome::Skipped(_) => {}
                    }
                }

                if !items.is_empty() {
                    lessons.push(LessonSection {
                        slug: lesson.slug.clone(),
                        items,
                    });
                }
            }

            if !lessons.is_empty() {
                modules.push(ModuleSection {
                    slug: module.slug.clone(),
                    lessons,
                });
            }
        }

        let (references, references_failed) = self
            .extract_references(&extractor, &course, policy)
            .await?;
        error_occurred |= references_failed;
        if !references.is_empty() {
            modules.push(ModuleSection {
                slug: RESOURCES_MODULE.to_string(),
                lessons: references,
            });
        }

        Ok((error_occurred, CourseTree { modules }))
    }

    /// Probes the syllabus endpoints in order; the first that answers fixes the variant.
    async fn fetch_syllabus(&self, class_name: &str) -> Result<(SchemaVariant, Value), RunError> {
        let mut last_error = None;
        for variant in SchemaVariant::ALL {
            let url = self.endpoints.syllabus(variant, class_name);
            match self.transport.get_json(&url).await {
                Ok(document) => {
                    debug!(%variant, "Syllabus endpoint answered");
                    return Ok((variant, document));
                }
                Err(error) => {
                    debug!(%variant, error = %error, "Syllabus endpoint did not answer");
                    last_error = Some(error);
                }
            }
        }
        Err(RunError::SyllabusUnavailable {
            class_name: class_name.to_string(),
            source: last_error.unwrap_or_else(|| TransportError::status(class_name, 404)),
        })
    }

    async fn fetch_item_index(&self, class_name: &str) -> ItemIndex {
        match self.transport.get_json(&self.endpoints.flat_items(class_name)).await {
            Ok(document) => ItemIndex::from_document(&document),
            Err(error) => {
                warn!(error = %error, "Flat item index unavailable; empty lessons will be dropped");
                ItemIndex::new()
            }
        }
    }

    async fn persist_assets(
        &self,
        extractor: &mut LinkExtractor,
        item: &ItemRow,
    ) -> Result<(), RunError> {
        for asset in extractor.take_resolved_assets() {
            let row = self
                .catalog
                .get_or_create_course_asset(&NewCourseAsset {
                    asset_id: &asset.id,
                    asset_type: &asset.asset_type,
                    name: &asset.name,
                    slug: &clean_filename(&asset.name, false),
                })
                .await?;
            self.catalog.link_item_asset(item.id, row.id).await?;
        }
        if let Some(video) = extractor.take_resolved_video() {
            self.catalog
                .get_or_create_video_asset(&NewVideoAsset {
                    asset_id: &video.video_id,
                    item: item.id,
                    subtitles: &video.languages.join(","),
                })
                .await?;
        }
        Ok(())
    }

    /// Polls course-level references and extracts each; returns the
    /// `Resources` lessons and whether any reference failed.
    async fn extract_references(
        &self,
        extractor: &LinkExtractor,
        course: &CourseRow,
        policy: &ExtractionPolicy,
    ) -> Result<(Vec<LessonSection>, bool), RunError> {
        let document = match self
            .transport
            .get_json(&self.endpoints.references_poll(&course.course_id))
            .await
        {
            Ok(document) => document,
            Err(error) => {
                warn!(error = %error, "Could not poll course references");
                return Ok((Vec::new(), false));
            }
        };
        let elements = document
            .get("elements")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if elements.is_empty() {
            return Ok((Vec::new(), false));
        }

        info!("Processing resources");
        let mut failed = false;
        let mut lessons = Vec::new();
        for element in elements {
            let field = |key: &str| element.get(key).and_then(Value::as_str);
            let (Some(ref_id), Some(short_id)) = (field("id"), field("shortId")) else {
                debug!("Skipping reference without id or shortId");
                continue;
            };
            let name = field("name").unwrap_or(short_id);
            let slug = clean_filename(field("slug").unwrap_or(name), policy.unrestricted_filenames);
            info!(reference = %slug, "Processing resource");

            self.catalog
                .get_or_create_reference(&NewReference {
                    ref_id,
                    course: course.id,
                    short_id,
                    name,
                    slug: &slug,
                })
                .await?;

            match extractor.extract_reference(short_id).await {
                ExtractOutcome::Links(links) => lessons.push(LessonSection {
                    slug,
                    items: vec![ItemLinks {
                        slug: String::new(),
                        links,
                    }],
                }),
                ExtractOutcome::Failed(_) => failed = true,
                ExtractOutcome::NoContent | ExtractOutcome::Skipped(_) => {}
            }
        }
        Ok((lessons, failed))
    }
}

fn malformed(endpoint: &'static str, class_name: &str, key: &'static str) -> RunError {
    RunError::MalformedResponse {
        endpoint,
        class_name: class_name.to_string(),
        key,
    }
}
