use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{MatchingError, MatchingRun, PairingOrchestrator};
use crate::models::{ErrorResponse, HealthResponse, MatchingCohorts, RunMatchingRequest, RunSummary};
use crate::services::{InMemoryStore, MatchResultStore, PostgresClient, RunCache};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<RunCache>,
    pub orchestrator: PairingOrchestrator,
    pub default_cohorts: MatchingCohorts,
    /// Held for the duration of a run; runs are never concurrent
    pub run_lock: Arc<tokio::sync::Mutex<()>>,
}

/// Configure all matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matching/run", web::post().to(run_matching))
        .route("/matching/runs/{run_id}", web::get().to(get_run));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Trigger a matching run
///
/// POST /api/v1/matching/run
///
/// Request body:
/// ```json
/// {
///   "seekerCohort": "string",
///   "poolCohort": "string",
///   "dryRun": false
/// }
/// ```
/// The body itself and every field are optional; cohorts default to the
/// configured ones. The content type is not checked.
async fn run_matching(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> impl Responder {
    let req = match RunMatchingRequest::from_body(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::info!("Rejected matching run body: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "invalid_json".to_string(),
                message: format!("Invalid JSON: {}", e),
                status_code: 400,
            });
        }
    };

    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let cohorts = resolve_cohorts(&req, &state.default_cohorts);

    let Ok(_guard) = state.run_lock.try_lock() else {
        tracing::info!("Rejected matching run for {:?}: another run is in progress", cohorts);
        return HttpResponse::Conflict().json(ErrorResponse {
            error: "Run in progress".to_string(),
            message: "Another matching run has not finished yet".to_string(),
            status_code: 409,
        });
    };

    tracing::info!(
        "Matching run requested: seekers={}, pool={}, dry_run={}",
        cohorts.seeker,
        cohorts.pool,
        req.dry_run
    );

    let started_at = chrono::Utc::now();

    // Dry runs write into a throwaway in-memory store
    let dry_run_store = InMemoryStore::new();
    let store: &dyn MatchResultStore = if req.dry_run {
        &dry_run_store
    } else {
        state.postgres.as_ref()
    };

    let result = state
        .orchestrator
        .run_from_repository(state.postgres.as_ref(), store, &cohorts)
        .await;

    match result {
        Ok(run) => {
            let summary = summarize(run, cohorts, req.dry_run, started_at);

            tracing::info!(
                "Run {} created {} pairs ({} seekers unmatched)",
                summary.run_id,
                summary.pairs_created,
                summary.unmatched_seekers.len()
            );

            state.cache.insert(summary.clone()).await;
            HttpResponse::Ok().json(summary)
        }
        Err(e @ MatchingError::SameCohort(_)) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid cohorts".to_string(),
            message: e.to_string(),
            status_code: 400,
        }),
        Err(e) => {
            tracing::error!("Matching run failed: {}", e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Matching run failed".to_string(),
                message: e.to_string(),
                status_code: 503,
            })
        }
    }
}

/// Fetch the summary of a recent run
///
/// GET /api/v1/matching/runs/{runId}
async fn get_run(
    state: web::Data<AppState>,
    run_id: web::Path<uuid::Uuid>,
) -> impl Responder {
    match state.cache.get(&run_id).await {
        Some(summary) => HttpResponse::Ok().json(summary),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "Run not found".to_string(),
            message: format!("No recent run with id {}", run_id),
            status_code: 404,
        }),
    }
}

fn resolve_cohorts(req: &RunMatchingRequest, defaults: &MatchingCohorts) -> MatchingCohorts {
    MatchingCohorts {
        seeker: req.seeker_cohort.clone().unwrap_or_else(|| defaults.seeker.clone()),
        pool: req.pool_cohort.clone().unwrap_or_else(|| defaults.pool.clone()),
    }
}

fn summarize(
    run: MatchingRun,
    cohorts: MatchingCohorts,
    dry_run: bool,
    started_at: chrono::DateTime<chrono::Utc>,
) -> RunSummary {
    RunSummary {
        run_id: uuid::Uuid::new_v4(),
        cohorts,
        dry_run,
        started_at,
        finished_at: chrono::Utc::now(),
        pairs_created: run.pairs.len(),
        pairs: run.pairs,
        unmatched_seekers: run.unmatched_seekers,
        excluded_seekers: run.excluded_seekers,
        excluded_candidates: run.excluded_candidates,
        failed_writes: run.failed_writes,
    }
}
