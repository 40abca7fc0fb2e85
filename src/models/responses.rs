use serde::{Deserialize, Serialize};
use crate::models::domain::{MatchResult, MatchingCohorts};

/// Why a valid seeker ended the run without a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnmatchedReason {
    /// No candidate was left in the pool when the seeker's turn came
    PoolExhausted,
    /// Every remaining candidate scored zero
    NoPositiveScore,
    /// A pair was chosen but the store rejected the write
    PersistFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedSeeker {
    #[serde(rename = "seekerId")]
    pub seeker_id: String,
    pub reason: UnmatchedReason,
}

/// Summary returned to the operator after a matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(rename = "runId")]
    pub run_id: uuid::Uuid,
    #[serde(flatten)]
    pub cohorts: MatchingCohorts,
    #[serde(rename = "dryRun")]
    pub dry_run: bool,
    #[serde(rename = "startedAt")]
    pub started_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "finishedAt")]
    pub finished_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "pairsCreated")]
    pub pairs_created: usize,
    pub pairs: Vec<MatchResult>,
    #[serde(rename = "unmatchedSeekers")]
    pub unmatched_seekers: Vec<UnmatchedSeeker>,
    #[serde(rename = "excludedSeekers")]
    pub excluded_seekers: usize,
    #[serde(rename = "excludedCandidates")]
    pub excluded_candidates: usize,
    #[serde(rename = "failedWrites")]
    pub failed_writes: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
