//! Campus Match - compatibility scoring and greedy pairing for a university dating service
//!
//! This library scores seekers against a pool of candidates under a weighted
//! rubric and commits one-to-one pairs in a single greedy pass.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{PairingOrchestrator, ScoringEngine, MatchingRun, MatchingError, WriteFailurePolicy};
pub use crate::models::{Candidate, Seeker, PreferenceProfile, MatchResult, Compatibility, ScoringWeights, RunSummary};
