//! URL builders for the platform API.

use urlencoding::encode;

use crate::syllabus::SchemaVariant;

/// Production API host.
pub const DEFAULT_API_BASE: &str = "https://api.coursera.org";

/// Production notebook hub host.
pub const DEFAULT_NOTEBOOK_BASE: &str = "https://hub.coursera-notebooks.org";

const SYLLABUS_V2_INCLUDES: &str = "includes=modules%2Clessons%2CpassableItemGroups%2CpassableItemGroupChoices%2CpassableLessonElements%2Citems%2Ctracks%2CgradePolicy\
&fields=moduleIds%2ConDemandCourseMaterialModules.v1(name%2Cslug%2Cdescription%2CtimeCommitment%2ClessonIds%2Coptional%2ClearningObjectives)\
%2ConDemandCourseMaterialLessons.v1(name%2Cslug%2CtimeCommitment%2CelementIds%2Coptional%2CtrackId)\
%2ConDemandCourseMaterialItems.v2(name%2Cslug%2CtimeCommitment%2CcontentSummary%2CisLocked%2ClockableByItem%2CitemLockedReasonCode%2CtrackId%2ClockedStatus%2CitemLockSummary)\
&showLockedItems=true";

const FLAT_ITEMS_INCLUDES: &str = "includes=moduleIds%2ClessonIds%2CpassableItemGroups%2CpassableItemGroupChoices%2CpassableLessonElements%2CitemIds%2Ctracks\
&fields=moduleIds%2ConDemandCourseMaterialItems.v1(name%2Cslug%2CtimeCommitment%2Ccontent%2CisLocked%2ClockableByItem%2CitemLockedReasonCode%2CtrackId%2ClessonId)\
&showLockedItems=true";

/// URL builders for every platform endpoint the core uses.
///
/// Both bases are configurable so tests can point the transport at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    api_base: String,
    notebook_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, DEFAULT_NOTEBOOK_BASE)
    }
}

impl Endpoints {
    /// Creates endpoints rooted at custom bases. Trailing slashes are ignored.
    #[must_use]
    pub fn new(api_base: impl Into<String>, notebook_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            notebook_base: notebook_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Returns the notebook hub base URL.
    #[must_use]
    pub fn notebook_base(&self) -> &str {
        &self.notebook_base
    }

    /// Makes a platform-relative path (`/api/...`) absolute against the API base.
    #[must_use]
    pub fn absolute(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with("//") {
            format!("https:{url}")
        } else {
            format!("{}/{}", self.api_base, url.trim_start_matches('/'))
        }
    }

    #[must_use]
    pub fn course(&self, class_name: &str) -> String {
        format!(
            "{}/api/onDemandCourses.v1?q=slug&slug={}",
            self.api_base,
            encode(class_name)
        )
    }

    #[must_use]
    pub fn memberships(&self) -> String {
        format!(
            "{}/api/memberships.v1?includes=courseId%2Ccourses.v1&q=me&showHidden=true&filter=current%2CpreEnrolled",
            self.api_base
        )
    }

    #[must_use]
    pub fn user_permissions(&self) -> String {
        format!("{}/api/adminUserPermissions.v1?q=my", self.api_base)
    }

    /// The syllabus endpoint whose answer is parsed as `variant`.
    #[must_use]
    pub fn syllabus(&self, variant: SchemaVariant, class_name: &str) -> String {
        let slug = encode(class_name);
        match variant {
            SchemaVariant::LinkedCollections => format!(
                "{}/api/onDemandCourseMaterials.v2/?q=slug&slug={slug}&{SYLLABUS_V2_INCLUDES}",
                self.api_base
            ),
            SchemaVariant::FlatWeeks => format!(
                "{}/api/onDemandCourseWeeks.v1/?q=slug&slug={slug}",
                self.api_base
            ),
            SchemaVariant::CourseMaterial => format!(
                "{}/api/opencourse.v1/course/{slug}?showLockedItems=true",
                self.api_base
            ),
        }
    }

    #[must_use]
    pub fn flat_items(&self, class_name: &str) -> String {
        format!(
            "{}/api/onDemandCourseMaterials.v1/?q=slug&slug={}&{FLAT_ITEMS_INCLUDES}",
            self.api_base,
            encode(class_name)
        )
    }

    #[must_use]
    pub fn lecture_videos(&self, course_id: &str, video_id: &str) -> String {
        format!(
            "{}/api/onDemandLectureVideos.v1/{course_id}~{video_id}?includes=video&fields=onDemandVideos.v1(sources%2Csubtitles%2CsubtitlesVtt%2CsubtitlesTxt)",
            self.api_base
        )
    }

    #[must_use]
    pub fn lecture_assets(&self, course_id: &str, video_id: &str) -> String {
        format!(
            "{}/api/onDemandLectureAssets.v1/{course_id}~{video_id}/?includes=openCourseAssets",
            self.api_base
        )
    }

    /// Resolves asset ids to downloadable URLs.
    #[must_use]
    pub fn assets(&self, asset_ids: &[String]) -> String {
        format!(
            "{}/api/assets.v1?ids={}&fields=fileExtension%2CfileName%2Curl",
            self.api_base,
            encode(&asset_ids.join(","))
        )
    }

    #[must_use]
    pub fn supplement(&self, course_id: &str, item_id: &str) -> String {
        format!(
            "{}/api/onDemandSupplements.v1/{course_id}~{item_id}?includes=asset&fields=openCourseAssets.v1%28typeName%29%2CopenCourseAssets.v1%28definition%29",
            self.api_base
        )
    }

    #[must_use]
    pub fn peer_instructions(&self, course_id: &str, item_id: &str, user_id: &str) -> String {
        format!(
            "{}/api/onDemandPeerAssignmentInstructions.v1/?q=latest&userId={user_id}&courseId={course_id}&itemId={item_id}&includes=gradingMetadata%2CreviewSchemas%2CsubmissionSchemas&fields=instructions",
            self.api_base
        )
    }

    #[must_use]
    pub fn programming_assignment(&self, course_id: &str, item_id: &str) -> String {
        format!(
            "{}/api/onDemandProgrammingLearnerAssignments.v1/{course_id}~{item_id}?fields=submissionLearnerSchema",
            self.api_base
        )
    }

    #[must_use]
    pub fn programming_immediate_instructions(&self, course_id: &str, item_id: &str) -> String {
        format!(
            "{}/api/onDemandProgrammingImmediateInstructions.v1/{course_id}~{item_id}",
            self.api_base
        )
    }

    #[must_use]
    pub fn quiz_session(&self, user_id: &str, class_name: &str, item_id: &str) -> String {
        format!(
            "{}/api/opencourse.v1/user/{user_id}/course/{}/item/{item_id}/quiz/session",
            self.api_base,
            encode(class_name)
        )
    }

    #[must_use]
    pub fn quiz_state(
        &self,
        user_id: &str,
        class_name: &str,
        item_id: &str,
        session_id: &str,
    ) -> String {
        format!(
            "{}/action/getState?autoEnroll=false",
            self.quiz_session(user_id, class_name, item_id) + "/" + session_id
        )
    }

    #[must_use]
    pub fn exam_sessions(&self) -> String {
        format!("{}/api/onDemandExamSessions.v1/", self.api_base)
    }

    #[must_use]
    pub fn exam_state(&self, session_id: &str) -> String {
        format!(
            "{}/api/onDemandExamSessions.v1/{session_id}/actions?includes=gradingAttempts",
            self.api_base
        )
    }

    #[must_use]
    pub fn notebook_launch(&self) -> String {
        format!(
            "{}/api/onDemandNotebookWorkspaceLaunches.v1/?fields=authorizationId%2CcontentPath%2CuseLegacySystem",
            self.api_base
        )
    }

    /// Lists a directory of a launched notebook workspace.
    #[must_use]
    pub fn notebook_contents(&self, authorization_id: &str, path: &str) -> String {
        format!(
            "{}/user/{authorization_id}/api/contents/{}",
            self.notebook_base,
            encode_path(path)
        )
    }

    /// Download URL of a file inside a launched notebook workspace.
    #[must_use]
    pub fn notebook_file(&self, authorization_id: &str, path: &str) -> String {
        format!(
            "{}/user/{authorization_id}/files/{}",
            self.notebook_base,
            encode_path(path)
        )
    }

    #[must_use]
    pub fn references_poll(&self, course_id: &str) -> String {
        format!(
            "{}/api/onDemandReferences.v1/?courseId={course_id}&q=courseListed&fields=name%2CshortId%2Cslug%2Ccontent&includes=assets",
            self.api_base
        )
    }

    #[must_use]
    pub fn reference(&self, course_id: &str, short_id: &str) -> String {
        format!(
            "{}/api/onDemandReferences.v1/?courseId={course_id}&q=shortId&shortId={short_id}&fields=name%2CshortId%2Cslug%2Ccontent&includes=assets",
            self.api_base
        )
    }
}

/// Percent-encodes each segment of a workspace path, dropping empty segments.
fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
