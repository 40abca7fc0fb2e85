// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod store;

pub use cache::RunCache;
pub use memory::InMemoryStore;
pub use postgres::{PostgresClient, PostgresError};
pub use store::{CandidateRepository, MatchResultStore, StoreError};
