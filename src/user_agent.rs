//! Shared User-Agent string for resolver and probe HTTP traffic.
//!
//! Single source for project URL and UA format so metadata lookups and landing
//! page probes identify the tool the same way.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/nicksrandall/findable";

/// Default User-Agent for every outbound request made during a run.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("findable/{version} (dataset-findability-check; +{PROJECT_UA_URL})")
}
