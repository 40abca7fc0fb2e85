use crate::models::{CandidateRecord, MatchResult, SeekerRecord};
use crate::services::store::{CandidateRepository, MatchResultStore, StoreError};
use async_trait::async_trait;
use std::sync::Mutex;

/// In-process record store
///
/// Backs dry runs (match results are kept in memory and discarded with the
/// store) and the test suite.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    seekers: Vec<SeekerRecord>,
    candidates: Vec<CandidateRecord>,
    results: Mutex<Vec<MatchResult>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(seekers: Vec<SeekerRecord>, candidates: Vec<CandidateRecord>) -> Self {
        Self {
            seekers,
            candidates,
            results: Mutex::new(Vec::new()),
        }
    }

    /// Match results written so far, in write order
    pub fn results(&self) -> Vec<MatchResult> {
        self.results
            .lock()
            .map(|results| results.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CandidateRepository for InMemoryStore {
    async fn load_seekers(&self, cohort: &str) -> Result<Vec<SeekerRecord>, StoreError> {
        Ok(self
            .seekers
            .iter()
            .filter(|r| r.profile.cohort.as_deref() == Some(cohort))
            .cloned()
            .collect())
    }

    async fn load_candidates(&self, cohort: &str) -> Result<Vec<CandidateRecord>, StoreError> {
        Ok(self
            .candidates
            .iter()
            .filter(|r| r.cohort.as_deref() == Some(cohort))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MatchResultStore for InMemoryStore {
    async fn create_match_result(
        &self,
        seeker_candidate_id: &str,
        other_candidate_id: &str,
        score: u32,
    ) -> Result<MatchResult, StoreError> {
        let result = MatchResult {
            id: uuid::Uuid::new_v4(),
            seeker_candidate_id: seeker_candidate_id.to_string(),
            other_candidate_id: other_candidate_id.to_string(),
            score,
            created_at: chrono::Utc::now(),
        };

        self.results
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store poisoned".to_string()))?
            .push(result.clone());

        Ok(result)
    }
}
