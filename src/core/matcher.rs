use crate::core::{
    pool::CandidatePool,
    scoring::ScoringEngine,
    validation::{validate_candidates, validate_seekers},
};
use crate::models::{
    CandidateRecord, Compatibility, MatchResult, MatchingCohorts, ScoringWeights, Seeker, SeekerRecord,
    UnmatchedReason, UnmatchedSeeker,
};
use crate::services::store::{CandidateRepository, MatchResultStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a matching run
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("Seeker and pool cohorts must differ (both are {0:?})")]
    SameCohort(String),

    #[error("Failed to load {cohort:?} records: {source}")]
    Load {
        cohort: String,
        #[source]
        source: StoreError,
    },

    #[error("Store became unavailable while saving {seeker_id} -> {candidate_id}: {source}")]
    Persist {
        seeker_id: String,
        candidate_id: String,
        #[source]
        source: StoreError,
    },
}

/// What happens to a chosen candidate when saving the pair fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteFailurePolicy {
    /// The candidate goes back into the pool for later seekers
    #[default]
    Release,
    /// The candidate stays removed even though no result was saved
    Consume,
}

/// Outcome of one matching run
#[derive(Debug, Default)]
pub struct MatchingRun {
    pub pairs: Vec<MatchResult>,
    pub unmatched_seekers: Vec<UnmatchedSeeker>,
    pub excluded_seekers: usize,
    pub excluded_candidates: usize,
    pub failed_writes: usize,
}

/// Greedy one-to-one pairing of a seeker cohort with a pool cohort
///
/// # Run
/// 1. Validate both cohorts, dropping incomplete records
/// 2. Walk seekers in the order given
/// 3. Score the seeker against every candidate still in the pool
/// 4. Commit the best pair if its score is above zero
///
/// Earlier seekers can take a candidate a later seeker would have scored
/// higher with; there is no backtracking.
#[derive(Debug, Clone)]
pub struct PairingOrchestrator {
    engine: ScoringEngine,
    on_write_failure: WriteFailurePolicy,
}

impl PairingOrchestrator {
    pub fn new(weights: ScoringWeights, on_write_failure: WriteFailurePolicy) -> Self {
        Self {
            engine: ScoringEngine::new(weights),
            on_write_failure,
        }
    }

    pub fn with_default_weights() -> Self {
        Self::new(ScoringWeights::default(), WriteFailurePolicy::default())
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Best-scoring available candidate for a seeker
    ///
    /// Ties go to the candidate loaded first. Returns `None` only when the
    /// pool is empty; the returned score may be zero.
    pub fn best_candidate(&self, seeker: &Seeker, pool: &CandidatePool) -> Option<(usize, Compatibility)> {
        let mut scored: Vec<(usize, Compatibility)> = pool
            .available()
            .map(|(index, candidate)| (index, self.engine.score(seeker, candidate)))
            .collect();

        // Sort by score (descending) and then by load order (ascending)
        scored.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(&b.0)));

        scored.into_iter().next()
    }

    /// Load both cohorts from the repository and run
    pub async fn run_from_repository(
        &self,
        repository: &dyn CandidateRepository,
        store: &dyn MatchResultStore,
        cohorts: &MatchingCohorts,
    ) -> Result<MatchingRun, MatchingError> {
        if cohorts.seeker == cohorts.pool {
            return Err(MatchingError::SameCohort(cohorts.seeker.clone()));
        }

        let seekers = repository
            .load_seekers(&cohorts.seeker)
            .await
            .map_err(|source| MatchingError::Load {
                cohort: cohorts.seeker.clone(),
                source,
            })?;

        let candidates = repository
            .load_candidates(&cohorts.pool)
            .await
            .map_err(|source| MatchingError::Load {
                cohort: cohorts.pool.clone(),
                source,
            })?;

        self.run(&seekers, &candidates, cohorts, store).await
    }

    /// Run over already loaded records
    ///
    /// `seekers` is processed in the given order. Each committed pair is
    /// saved before the next seeker is considered.
    pub async fn run(
        &self,
        seekers: &[SeekerRecord],
        candidates: &[CandidateRecord],
        cohorts: &MatchingCohorts,
        store: &dyn MatchResultStore,
    ) -> Result<MatchingRun, MatchingError> {
        if cohorts.seeker == cohorts.pool {
            return Err(MatchingError::SameCohort(cohorts.seeker.clone()));
        }

        let seekers = validate_seekers(seekers, &cohorts.seeker);
        let candidates = validate_candidates(candidates, &cohorts.pool);

        tracing::info!(
            "Starting matching run: {} seekers ({} excluded), {} candidates ({} excluded)",
            seekers.valid.len(),
            seekers.excluded,
            candidates.valid.len(),
            candidates.excluded
        );

        let mut run = MatchingRun {
            excluded_seekers: seekers.excluded,
            excluded_candidates: candidates.excluded,
            ..Default::default()
        };
        let mut pool = CandidatePool::new(candidates.valid);

        for seeker in &seekers.valid {
            let Some((index, compatibility)) = self.best_candidate(seeker, &pool) else {
                run.unmatched(seeker, UnmatchedReason::PoolExhausted);
                continue;
            };

            if compatibility.total == 0 {
                tracing::debug!("No positive score for seeker {}", seeker.id());
                run.unmatched(seeker, UnmatchedReason::NoPositiveScore);
                continue;
            }

            // Index came from the pool just above
            let Some(candidate) = pool.take(index) else {
                continue;
            };

            match store
                .create_match_result(seeker.id(), &candidate.id, compatibility.total)
                .await
            {
                Ok(result) => {
                    tracing::debug!(
                        "Matched {} -> {} (score {})",
                        result.seeker_candidate_id,
                        result.other_candidate_id,
                        result.score
                    );
                    run.pairs.push(result);
                }
                Err(source) if source.is_fatal() => {
                    tracing::error!(
                        "Aborting matching run after {} pairs: {}",
                        run.pairs.len(),
                        source
                    );
                    return Err(MatchingError::Persist {
                        seeker_id: seeker.id().to_string(),
                        candidate_id: candidate.id,
                        source,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to save match {} -> {}: {} (candidate {})",
                        seeker.id(),
                        candidate.id,
                        e,
                        match self.on_write_failure {
                            WriteFailurePolicy::Release => "released",
                            WriteFailurePolicy::Consume => "consumed",
                        }
                    );
                    run.failed_writes += 1;
                    run.unmatched(seeker, UnmatchedReason::PersistFailed);

                    if self.on_write_failure == WriteFailurePolicy::Release {
                        pool.restore(index, candidate);
                    }
                }
            }
        }

        tracing::info!(
            "Matching run finished: {} pairs, {} unmatched seekers, {} failed writes",
            run.pairs.len(),
            run.unmatched_seekers.len(),
            run.failed_writes
        );

        Ok(run)
    }
}

impl Default for PairingOrchestrator {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

impl MatchingRun {
    fn unmatched(&mut self, seeker: &Seeker, reason: UnmatchedReason) {
        self.unmatched_seekers.push(UnmatchedSeeker {
            seeker_id: seeker.id().to_string(),
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PreferenceRecord, ScoreBreakdown};
    use crate::services::InMemoryStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn create_candidate(id: &str, age: i32, department: &str, mbti: &str) -> CandidateRecord {
        CandidateRecord {
            candidate_id: id.to_string(),
            display_name: Some(format!("User {}", id)),
            cohort: Some("pool".to_string()),
            age: Some(age),
            department_label: Some(department.to_string()),
            mbti_code: Some(mbti.to_string()),
            height_cm: Some(175.0),
            personality_traits: Some(vec!["kind".to_string()]),
            dating_style_traits: Some(vec!["active".to_string()]),
            smoking: Some(false),
            drinking: Some(false),
            tattoo: Some(false),
        }
    }

    fn create_seeker(id: &str, department: &str) -> SeekerRecord {
        let mut profile = create_candidate(id, 22, department, "INTP");
        profile.cohort = Some("seeker".to_string());

        SeekerRecord {
            profile,
            preferences: Some(PreferenceRecord {
                preferred_age_type: Some("SAME".to_string()),
                preferred_height_min: Some(170.0),
                preferred_height_max: Some(180.0),
                preferred_mbti_list: Some(vec!["ENFP".to_string()]),
                disliked_mbti_list: Some(vec!["ISTJ".to_string()]),
                preferred_personality_traits: Some(vec!["kind".to_string()]),
                preferred_dating_style_traits: Some(vec!["active".to_string()]),
                preferred_smoking: Some(false),
                preferred_drinking: Some(false),
                preferred_tattoo: Some(false),
            }),
        }
    }

    fn cohorts() -> MatchingCohorts {
        MatchingCohorts::new("seeker", "pool")
    }

    /// Rejects writes for the listed candidates
    struct FlakyStore {
        reject: Vec<String>,
        fatal: bool,
        inner: InMemoryStore,
        attempts: Mutex<usize>,
    }

    impl FlakyStore {
        fn rejecting(ids: &[&str], fatal: bool) -> Self {
            Self {
                reject: ids.iter().map(|s| s.to_string()).collect(),
                fatal,
                inner: InMemoryStore::new(),
                attempts: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl MatchResultStore for FlakyStore {
        async fn create_match_result(
            &self,
            seeker_candidate_id: &str,
            other_candidate_id: &str,
            score: u32,
        ) -> Result<MatchResult, StoreError> {
            *self.attempts.lock().unwrap() += 1;
            if self.reject.iter().any(|id| id == other_candidate_id) {
                return Err(if self.fatal {
                    StoreError::Unavailable("connection refused".to_string())
                } else {
                    StoreError::Write("constraint violation".to_string())
                });
            }
            self.inner
                .create_match_result(seeker_candidate_id, other_candidate_id, score)
                .await
        }
    }

    #[tokio::test]
    async fn test_pairs_best_candidate() {
        let orchestrator = PairingOrchestrator::with_default_weights();
        let store = InMemoryStore::new();

        let seekers = vec![create_seeker("s1", "Physics")];
        let candidates = vec![
            create_candidate("c1", 22, "Law", "ISTJ"),  // Disliked type
            create_candidate("c2", 22, "Law", "ENFP"),  // Liked type
        ];

        let run = orchestrator.run(&seekers, &candidates, &cohorts(), &store).await.unwrap();

        assert_eq!(run.pairs.len(), 1);
        assert_eq!(run.pairs[0].seeker_candidate_id, "s1");
        assert_eq!(run.pairs[0].other_candidate_id, "c2");
        assert_eq!(run.pairs[0].score, 100);
        assert_eq!(store.results().len(), 1);
    }

    #[tokio::test]
    async fn test_ties_go_to_first_loaded() {
        let orchestrator = PairingOrchestrator::with_default_weights();
        let store = InMemoryStore::new();

        let seekers = vec![create_seeker("s1", "Physics"), create_seeker("s2", "Physics")];
        let candidates = vec![
            create_candidate("c1", 23, "Law", "ENFP"),
            create_candidate("c2", 23, "Art", "ENFP"),
        ];

        let run = orchestrator.run(&seekers, &candidates, &cohorts(), &store).await.unwrap();

        let pairs: Vec<(&str, &str)> = run
            .pairs
            .iter()
            .map(|p| (p.seeker_candidate_id.as_str(), p.other_candidate_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("s1", "c1"), ("s2", "c2")]);
    }

    #[tokio::test]
    async fn test_zero_score_leaves_seeker_unmatched() {
        let orchestrator = PairingOrchestrator::with_default_weights();
        let store = InMemoryStore::new();

        let seekers = vec![create_seeker("s1", "Physics"), create_seeker("s2", "Law")];
        let candidates = vec![create_candidate("c1", 22, "Physics", "ENFP")];

        let run = orchestrator.run(&seekers, &candidates, &cohorts(), &store).await.unwrap();

        // s1 shares the department, s2 gets the candidate
        assert_eq!(run.unmatched_seekers, vec![UnmatchedSeeker {
            seeker_id: "s1".to_string(),
            reason: UnmatchedReason::NoPositiveScore,
        }]);
        assert_eq!(run.pairs.len(), 1);
        assert_eq!(run.pairs[0].seeker_candidate_id, "s2");
    }

    #[tokio::test]
    async fn test_pool_exhaustion() {
        let orchestrator = PairingOrchestrator::with_default_weights();
        let store = InMemoryStore::new();

        let seekers = vec![create_seeker("s1", "Physics"), create_seeker("s2", "Physics")];
        let candidates = vec![create_candidate("c1", 22, "Law", "ENFP")];

        let run = orchestrator.run(&seekers, &candidates, &cohorts(), &store).await.unwrap();

        assert_eq!(run.pairs.len(), 1);
        assert_eq!(run.unmatched_seekers[0].seeker_id, "s2");
        assert_eq!(run.unmatched_seekers[0].reason, UnmatchedReason::PoolExhausted);
    }

    #[tokio::test]
    async fn test_incomplete_records_counted() {
        let orchestrator = PairingOrchestrator::with_default_weights();
        let store = InMemoryStore::new();

        let mut no_prefs = create_seeker("s2", "Physics");
        no_prefs.preferences = None;
        let mut no_height = create_candidate("c2", 22, "Law", "ENFP");
        no_height.height_cm = None;

        let seekers = vec![create_seeker("s1", "Physics"), no_prefs];
        let candidates = vec![no_height, create_candidate("c1", 22, "Law", "ENFP")];

        let run = orchestrator.run(&seekers, &candidates, &cohorts(), &store).await.unwrap();

        assert_eq!(run.excluded_seekers, 1);
        assert_eq!(run.excluded_candidates, 1);
        assert_eq!(run.pairs.len(), 1);
        assert!(run.unmatched_seekers.is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_releases_candidate() {
        let orchestrator = PairingOrchestrator::new(ScoringWeights::default(), WriteFailurePolicy::Release);
        let store = FlakyStore::rejecting(&["c1"], false);

        let seekers = vec![create_seeker("s1", "Physics"), create_seeker("s2", "Physics")];
        let candidates = vec![
            create_candidate("c1", 22, "Law", "ENFP"),
            create_candidate("c2", 22, "Law", "ISTJ"),
        ];

        let run = orchestrator.run(&seekers, &candidates, &cohorts(), &store).await.unwrap();

        // s1's write fails, c1 is released, s2 retries c1 and fails again
        assert_eq!(run.failed_writes, 2);
        assert_eq!(*store.attempts.lock().unwrap(), 2);
        assert!(run.pairs.is_empty());
        assert_eq!(run.unmatched_seekers.len(), 2);
        assert!(run.unmatched_seekers.iter().all(|u| u.reason == UnmatchedReason::PersistFailed));
    }

    #[tokio::test]
    async fn test_write_failure_consumes_candidate() {
        let orchestrator = PairingOrchestrator::new(ScoringWeights::default(), WriteFailurePolicy::Consume);
        let store = FlakyStore::rejecting(&["c1"], false);

        let seekers = vec![create_seeker("s1", "Physics"), create_seeker("s2", "Physics")];
        let candidates = vec![
            create_candidate("c1", 22, "Law", "ENFP"),
            create_candidate("c2", 22, "Law", "ISTJ"),
        ];

        let run = orchestrator.run(&seekers, &candidates, &cohorts(), &store).await.unwrap();

        assert_eq!(run.failed_writes, 1);
        assert_eq!(run.pairs.len(), 1);
        assert_eq!(run.pairs[0].seeker_candidate_id, "s2");
        assert_eq!(run.pairs[0].other_candidate_id, "c2");
    }

    #[tokio::test]
    async fn test_fatal_store_error_aborts() {
        let orchestrator = PairingOrchestrator::with_default_weights();
        let store = FlakyStore::rejecting(&["c2"], true);

        let seekers = vec![create_seeker("s1", "Physics"), create_seeker("s2", "Physics")];
        let candidates = vec![
            create_candidate("c1", 22, "Law", "ENFP"),
            create_candidate("c2", 22, "Law", "ENFP"),
        ];

        let err = orchestrator.run(&seekers, &candidates, &cohorts(), &store).await.unwrap_err();

        assert!(matches!(err, MatchingError::Persist { ref candidate_id, .. } if candidate_id == "c2"));
        // The first pair was already saved
        assert_eq!(store.inner.results().len(), 1);
    }

    #[tokio::test]
    async fn test_same_cohort_rejected() {
        let orchestrator = PairingOrchestrator::with_default_weights();
        let store = InMemoryStore::new();

        let err = orchestrator
            .run(&[], &[], &MatchingCohorts::new("pool", "pool"), &store)
            .await
            .unwrap_err();

        assert!(matches!(err, MatchingError::SameCohort(_)));
    }

    #[test]
    fn test_best_candidate_reports_breakdown() {
        let orchestrator = PairingOrchestrator::with_default_weights();
        let seeker = crate::core::validation::validate_seeker(&create_seeker("s1", "Physics"), "seeker").unwrap();
        let pool = CandidatePool::new(
            validate_candidates(&[create_candidate("c1", 22, "Physics", "ENFP")], "pool").valid,
        );

        let (index, compatibility) = orchestrator.best_candidate(&seeker, &pool).unwrap();

        assert_eq!(index, 0);
        assert_eq!(compatibility.breakdown, ScoreBreakdown::SameDepartment);
        assert!(orchestrator.best_candidate(&seeker, &CandidatePool::new(vec![])).is_none());
    }
}
