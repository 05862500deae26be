//! Shared User-Agent string for counter service HTTP traffic.
//!
//! Single source for project URL and UA format so counter traffic stays
//! consistent and easy to update (good citizenship; RFC 9308).

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/nicksrandall/tallygate";

/// User-Agent for counter increment requests (identifies the tool).
#[must_use]
pub(crate) fn counter_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("tallygate/{version} (download-counter; +{PROJECT_UA_URL})")
}
