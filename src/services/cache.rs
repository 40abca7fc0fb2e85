use crate::models::RunSummary;
use std::time::Duration;

/// Recent run summaries, served to the dashboard by run id
///
/// In-memory only: summaries are lost on restart, the match results
/// themselves live in PostgreSQL.
pub struct RunCache {
    summaries: moka::future::Cache<uuid::Uuid, RunSummary>,
}

impl RunCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let summaries = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { summaries }
    }

    pub async fn insert(&self, summary: RunSummary) {
        tracing::trace!("Cache set: run {}", summary.run_id);
        self.summaries.insert(summary.run_id, summary).await;
    }

    pub async fn get(&self, run_id: &uuid::Uuid) -> Option<RunSummary> {
        let hit = self.summaries.get(run_id).await;
        if hit.is_none() {
            tracing::trace!("Cache miss: run {}", run_id);
        }
        hit
    }
}
