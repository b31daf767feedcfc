//! Tracker error taxonomy.

use thiserror::Error;

use arthur_models::{JobId, JobKind, ValidationError};
use arthur_providers::ProviderError;
use arthur_store::StoreError;

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// Required input missing or malformed; raised before any remote call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No provider registered for {0} generation")]
    UnsupportedKind(JobKind),

    /// The remote API rejected a request, or the transport failed.
    #[error(transparent)]
    Remote(#[from] ProviderError),

    /// Polling budget exhausted without a terminal remote state. The
    /// remote job is left running; callers may resume with a fresh
    /// budget.
    #[error("Job {job_id} not terminal after {attempts} polling attempts")]
    Timeout { job_id: JobId, attempts: u32 },

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TrackerError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
