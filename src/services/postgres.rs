use crate::models::{CandidateRecord, MatchResult, PreferenceRecord, SeekerRecord};
use crate::services::store::{CandidateRepository, MatchResultStore, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

impl From<PostgresError> for StoreError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::SqlxError(e) if is_connectivity_error(&e) => StoreError::Unavailable(e.to_string()),
            other => StoreError::Write(other.to_string()),
        }
    }
}

/// Errors after which no further query on the pool can be expected to succeed
fn is_connectivity_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

const CANDIDATE_COLUMNS: &str = r#"
    c.candidate_id, c.display_name, c.cohort, c.age, c.department_label, c.mbti_code,
    c.height_cm, c.personality_traits, c.dating_style_traits, c.smoking, c.drinking, c.tattoo
"#;

/// PostgreSQL client for the matching tables
///
/// Reads both cohorts and writes one `match_results` row per committed pair.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Seekers of a cohort with their preference profile, oldest first
    pub async fn fetch_seekers(&self, cohort: &str) -> Result<Vec<SeekerRecord>, PostgresError> {
        let query = format!(
            r#"
            SELECT {CANDIDATE_COLUMNS},
                p.candidate_id AS pref_candidate_id,
                p.preferred_age_type, p.preferred_height_min, p.preferred_height_max,
                p.preferred_mbti_list, p.disliked_mbti_list,
                p.preferred_personality_traits, p.preferred_dating_style_traits,
                p.preferred_smoking, p.preferred_drinking, p.preferred_tattoo
            FROM candidates c
            LEFT JOIN preference_profiles p ON p.candidate_id = c.candidate_id
            WHERE c.cohort = $1
            ORDER BY c.created_at ASC, c.candidate_id ASC
            "#
        );

        let rows = sqlx::query(&query).bind(cohort).fetch_all(&self.pool).await?;

        let seekers = rows
            .iter()
            .map(|row| {
                Ok(SeekerRecord {
                    profile: candidate_from_row(row)?,
                    preferences: preferences_from_row(row)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("Loaded {} seekers for cohort {}", seekers.len(), cohort);

        Ok(seekers)
    }

    /// Profiles of a cohort, oldest first
    pub async fn fetch_candidates(&self, cohort: &str) -> Result<Vec<CandidateRecord>, PostgresError> {
        let query = format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM candidates c
            WHERE c.cohort = $1
            ORDER BY c.created_at ASC, c.candidate_id ASC
            "#
        );

        let rows = sqlx::query(&query).bind(cohort).fetch_all(&self.pool).await?;

        let candidates = rows
            .iter()
            .map(candidate_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::debug!("Loaded {} candidates for cohort {}", candidates.len(), cohort);

        Ok(candidates)
    }

    /// Insert one match result
    pub async fn insert_match_result(
        &self,
        seeker_candidate_id: &str,
        other_candidate_id: &str,
        score: u32,
    ) -> Result<MatchResult, PostgresError> {
        let query = r#"
            INSERT INTO match_results (id, seeker_candidate_id, other_candidate_id, score, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING created_at
        "#;

        let id = uuid::Uuid::new_v4();
        let row = sqlx::query(query)
            .bind(id)
            .bind(seeker_candidate_id)
            .bind(other_candidate_id)
            .bind(score as i32)
            .fetch_one(&self.pool)
            .await?;

        Ok(MatchResult {
            id,
            seeker_candidate_id: seeker_candidate_id.to_string(),
            other_candidate_id: other_candidate_id.to_string(),
            score,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn candidate_from_row(row: &PgRow) -> Result<CandidateRecord, sqlx::Error> {
    Ok(CandidateRecord {
        candidate_id: row.try_get("candidate_id")?,
        display_name: row.try_get("display_name")?,
        cohort: row.try_get("cohort")?,
        age: row.try_get("age")?,
        department_label: row.try_get("department_label")?,
        mbti_code: row.try_get("mbti_code")?,
        height_cm: row.try_get("height_cm")?,
        personality_traits: row.try_get("personality_traits")?,
        dating_style_traits: row.try_get("dating_style_traits")?,
        smoking: row.try_get("smoking")?,
        drinking: row.try_get("drinking")?,
        tattoo: row.try_get("tattoo")?,
    })
}

/// `None` when the LEFT JOIN found no preference profile
fn preferences_from_row(row: &PgRow) -> Result<Option<PreferenceRecord>, sqlx::Error> {
    let joined: Option<String> = row.try_get("pref_candidate_id")?;
    if joined.is_none() {
        return Ok(None);
    }

    Ok(Some(PreferenceRecord {
        preferred_age_type: row.try_get("preferred_age_type")?,
        preferred_height_min: row.try_get("preferred_height_min")?,
        preferred_height_max: row.try_get("preferred_height_max")?,
        preferred_mbti_list: row.try_get("preferred_mbti_list")?,
        disliked_mbti_list: row.try_get("disliked_mbti_list")?,
        preferred_personality_traits: row.try_get("preferred_personality_traits")?,
        preferred_dating_style_traits: row.try_get("preferred_dating_style_traits")?,
        preferred_smoking: row.try_get("preferred_smoking")?,
        preferred_drinking: row.try_get("preferred_drinking")?,
        preferred_tattoo: row.try_get("preferred_tattoo")?,
    }))
}

#[async_trait]
impl CandidateRepository for PostgresClient {
    async fn load_seekers(&self, cohort: &str) -> Result<Vec<SeekerRecord>, StoreError> {
        self.fetch_seekers(cohort).await.map_err(Into::into)
    }

    async fn load_candidates(&self, cohort: &str) -> Result<Vec<CandidateRecord>, StoreError> {
        self.fetch_candidates(cohort).await.map_err(Into::into)
    }
}

#[async_trait]
impl MatchResultStore for PostgresClient {
    async fn create_match_result(
        &self,
        seeker_candidate_id: &str,
        other_candidate_id: &str,
        score: u32,
    ) -> Result<MatchResult, StoreError> {
        self.insert_match_result(seeker_candidate_id, other_candidate_id, score)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_errors_are_fatal() {
        let err: StoreError = PostgresError::SqlxError(sqlx::Error::PoolTimedOut).into();
        assert!(err.is_fatal());

        let err: StoreError = PostgresError::SqlxError(sqlx::Error::RowNotFound).into();
        assert!(!err.is_fatal());
    }
}
