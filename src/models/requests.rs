use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to trigger a matching run
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RunMatchingRequest {
    /// Overrides the configured seeker cohort
    #[validate(length(min = 1))]
    #[serde(alias = "seeker_cohort", rename = "seekerCohort", default)]
    pub seeker_cohort: Option<String>,
    /// Overrides the configured pool cohort
    #[validate(length(min = 1))]
    #[serde(alias = "pool_cohort", rename = "poolCohort", default)]
    pub pool_cohort: Option<String>,
    /// Score and pair without writing any match result
    #[serde(alias = "dry_run", rename = "dryRun", default)]
    pub dry_run: bool,
}

impl RunMatchingRequest {
    /// Parse a request body; an empty body asks for a default run
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}
