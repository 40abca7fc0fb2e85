use crate::models::{CandidateRecord, MatchResult, SeekerRecord};
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by the record and match-result collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached; a run cannot continue
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A single write was rejected; other writes may still succeed
    #[error("Write failed: {0}")]
    Write(String),
}

impl StoreError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Loads the two cohorts for a matching run
///
/// Implementations return seekers in a stable order; the run processes them
/// in exactly that order.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    /// Seeker-cohort profiles joined with their preference profiles
    async fn load_seekers(&self, cohort: &str) -> Result<Vec<SeekerRecord>, StoreError>;

    /// Pool-cohort profiles
    async fn load_candidates(&self, cohort: &str) -> Result<Vec<CandidateRecord>, StoreError>;
}

/// Receives each committed pair as soon as it is decided
#[async_trait]
pub trait MatchResultStore: Send + Sync {
    async fn create_match_result(
        &self,
        seeker_candidate_id: &str,
        other_candidate_id: &str,
        score: u32,
    ) -> Result<MatchResult, StoreError>;
}
