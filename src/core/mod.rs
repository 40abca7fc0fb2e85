// Core algorithm exports
pub mod matcher;
pub mod pool;
pub mod scoring;
pub mod validation;

pub use matcher::{MatchingError, MatchingRun, PairingOrchestrator, WriteFailurePolicy};
pub use pool::CandidatePool;
pub use scoring::{calculate_compatibility, ScoringEngine};
pub use validation::{validate_candidate, validate_candidates, validate_preferences, validate_seeker, validate_seekers, ExclusionReason, Validated};
