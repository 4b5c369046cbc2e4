//! Shared User-Agent string for platform API traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/coursera-dl/coursedl";

/// Default User-Agent for API requests.
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("coursedl/{version} (course-catalog; +{PROJECT_UA_URL})")
}
