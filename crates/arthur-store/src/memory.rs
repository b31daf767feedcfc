//! In-memory job store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use arthur_models::{Job, JobId, JobState};

use crate::error::{StoreError, StoreResult};
use crate::{CasOutcome, JobStore};

/// Job store backed by a process-local map. Suitable for tests and
/// single-process deployments; records do not survive a restart.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn get(&self, id: &JobId) -> StoreResult<Option<Job>> {
        Ok(self.jobs.read().await.get(id.as_str()).cloned())
    }

    async fn put(&self, job: &Job) -> StoreResult<()> {
        self.jobs
            .write()
            .await
            .insert(job.id.as_str().to_string(), job.clone());
        Ok(())
    }

    async fn list(&self, state: Option<JobState>) -> StoreResult<Vec<Job>> {
        let jobs = self.jobs.read().await;
        Ok(jobs
            .values()
            .filter(|j| state.map_or(true, |s| j.state == s))
            .cloned()
            .collect())
    }

    async fn compare_and_swap(&self, expected: JobState, job: &Job) -> StoreResult<CasOutcome> {
        let mut jobs = self.jobs.write().await;

        let current = jobs
            .get(job.id.as_str())
            .ok_or_else(|| StoreError::NotFound(job.id.to_string()))?;

        if current.state != expected {
            return Ok(CasOutcome::Conflict(current.clone()));
        }

        jobs.insert(job.id.as_str().to_string(), job.clone());
        Ok(CasOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arthur_models::{GenerationInput, JobResult};

    fn pending_job(id: &str) -> Job {
        Job::new(
            JobId::from_string(id),
            arthur_models::JobKind::Image,
            GenerationInput {
                prompt: Some("a castle".to_string()),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryJobStore::new();
        let job = pending_job("job-1");

        store.put(&job).await.unwrap();
        let fetched = store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.state, JobState::Pending);

        assert!(store.get(&JobId::from_string("missing")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cas_applies_once() {
        let store = MemoryJobStore::new();
        let job = pending_job("job-1");
        store.put(&job).await.unwrap();

        let completed = job.clone().complete(JobResult::single("image", "https://x/a.png"));

        let first = store
            .compare_and_swap(JobState::Pending, &completed)
            .await
            .unwrap();
        assert!(first.is_applied());

        // Second writer expecting the old state loses the race and sees
        // the record the winner stored.
        let second = store
            .compare_and_swap(JobState::Pending, &completed)
            .await
            .unwrap();
        match second {
            CasOutcome::Conflict(current) => assert_eq!(current.state, JobState::Completed),
            CasOutcome::Applied => panic!("duplicate transition applied"),
        }
    }

    #[tokio::test]
    async fn test_cas_missing_record() {
        let store = MemoryJobStore::new();
        let job = pending_job("job-1");

        let err = store
            .compare_and_swap(JobState::Pending, &job)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_state() {
        let store = MemoryJobStore::new();
        let a = pending_job("a");
        let b = pending_job("b").start();
        store.put(&a).await.unwrap();
        store.put(&b).await.unwrap();

        let pending = store.list(Some(JobState::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id.as_str(), "a");

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
