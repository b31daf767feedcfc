//! Job store abstraction for the Arthur AI generation backend.
//!
//! The tracker never touches a concrete datastore directly; it goes
//! through [`JobStore`], so jobs can live in memory (tests, single
//! process) or in Redis (across restarts) without the tracker caring.
//! The `compare_and_swap` write is what makes terminal transitions
//! apply at most once under concurrent polling.

pub mod error;
pub mod memory;
pub mod redis;

use async_trait::async_trait;

use arthur_models::{Job, JobId, JobState};

pub use crate::error::{StoreError, StoreResult};
pub use crate::memory::MemoryJobStore;
pub use crate::redis::{RedisJobStore, RedisStoreConfig};

/// Outcome of a guarded state-transition write.
#[derive(Debug)]
pub enum CasOutcome {
    /// The stored record matched the expected state and was replaced.
    Applied,
    /// Another writer got there first; carries the current stored record.
    Conflict(Job),
}

impl CasOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CasOutcome::Applied)
    }
}

/// Persistence interface for job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch a job by id.
    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>>;

    /// Insert or overwrite a job record unconditionally. Used for the
    /// initial insert at submit time, before any concurrent reconciler
    /// can observe the id.
    async fn put(&self, job: &Job) -> StoreResult<()>;

    /// List stored jobs, optionally filtered by state.
    async fn list(&self, state: Option<JobState>) -> StoreResult<Vec<Job>>;

    /// Replace the stored record with `job` only if the stored record is
    /// still in `expected` state. Returns `NotFound` when no record
    /// exists for the id.
    async fn compare_and_swap(&self, expected: JobState, job: &Job) -> StoreResult<CasOutcome>;
}
