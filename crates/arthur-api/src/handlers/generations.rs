//! Generation job handlers.
//!
//! Thin wrappers over the tracker: create a generation, poll its
//! status, list jobs for the dashboard, or block server-side until the
//! job settles.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use arthur_models::{GenerationInput, Job, JobId, JobKind, JobResult, JobState};
use arthur_store::JobStore;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Types
// ============================================================================

/// Request to start a generation.
#[derive(Debug, Deserialize)]
pub struct CreateGenerationRequest {
    /// What to generate
    pub kind: JobKind,
    /// Kind-specific parameters
    #[serde(flatten)]
    pub input: GenerationInput,
}

/// Canonical job view returned by every generation endpoint.
#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    /// Job ID
    pub id: String,
    /// What is being generated
    pub kind: JobKind,
    /// Current status: pending, in_progress, completed, failed
    pub status: JobState,
    /// Artifact URLs, present once completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    /// Failure reason, present once failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the job was created (RFC3339)
    pub created_at: String,
    /// When the job last changed state (RFC3339)
    pub updated_at: String,
}

impl From<Job> for GenerationResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id.to_string(),
            kind: job.kind,
            status: job.state,
            result: job.result,
            error: job.failure_reason,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing generations.
#[derive(Debug, Deserialize)]
pub struct ListGenerationsQuery {
    /// Only return jobs in this state.
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Response for listing generations.
#[derive(Debug, Serialize)]
pub struct ListGenerationsResponse {
    pub generations: Vec<GenerationResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/generations
///
/// Start a generation job with the provider responsible for `kind`.
///
/// Returns:
/// - 202: Job accepted, body carries the id to poll
/// - 400: Required input missing for the requested kind
/// - 502: The provider rejected the creation request
pub async fn create_generation(
    State(state): State<AppState>,
    Json(request): Json<CreateGenerationRequest>,
) -> ApiResult<(StatusCode, Json<GenerationResponse>)> {
    info!("create_generation kind={}", request.kind);

    let job = state.tracker.submit(request.kind, request.input).await?;

    Ok((StatusCode::ACCEPTED, Json(job.into())))
}

/// GET /api/generations/:job_id
///
/// Get the current status of a generation job, reconciled against the
/// remote provider. Used as the client-side polling endpoint.
///
/// Returns:
/// - 200: Current job status
/// - 404: Unknown job id
/// - 502: The remote status query failed (the job itself is unaffected)
pub async fn get_generation(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<GenerationResponse>> {
    let job_id = parse_job_id(&job_id)?;

    let job = state.tracker.poll(&job_id).await?;

    Ok(Json(job.into()))
}

/// GET /api/generations
///
/// List tracked generation jobs, newest first, optionally filtered by
/// state. Backs the dashboard's jobs view.
pub async fn list_generations(
    State(state): State<AppState>,
    Query(query): Query<ListGenerationsQuery>,
) -> ApiResult<Json<ListGenerationsResponse>> {
    let mut jobs = state.store.list(query.state).await.map_err(|e| {
        ApiError::internal(format!("Failed to list jobs: {e}"))
    })?;

    jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ListGenerationsResponse {
        generations: jobs.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/generations/:job_id/wait
///
/// Block until the job reaches a terminal state, bounded by both the
/// polling budget and the configured wall-clock timeout.
///
/// Returns:
/// - 200: Terminal job
/// - 404: Unknown job id
/// - 504: Budget exhausted; the remote job keeps running and the
///   client may retry with a fresh wait
pub async fn wait_generation(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<GenerationResponse>> {
    let job_id = parse_job_id(&job_id)?;

    let job = tokio::time::timeout(
        state.config.wait_timeout,
        state.tracker.wait_until_terminal(&job_id, &state.poll_policy),
    )
    .await
    .map_err(|_| {
        ApiError::WaitExhausted(format!(
            "Job {} still running after {:?}",
            job_id, state.config.wait_timeout
        ))
    })??;

    Ok(Json(job.into()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Validate the job id path segment before it reaches the store or a
/// provider URL. Remote ids are opaque but always URL-safe tokens.
fn parse_job_id(id: &str) -> ApiResult<JobId> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !valid {
        return Err(ApiError::bad_request("Invalid job ID format"));
    }

    Ok(JobId::from_string(id))
}
