// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AgePreference, Candidate, CandidateRecord, Compatibility, CriterionScores, LifestyleFlags,
    MatchResult, MatchingCohorts, PreferenceProfile, PreferenceRecord, ScoreBreakdown, ScoringWeights,
    Seeker, SeekerRecord, MAX_SCORE,
};
pub use requests::RunMatchingRequest;
pub use responses::{ErrorResponse, HealthResponse, RunSummary, UnmatchedReason, UnmatchedSeeker};
