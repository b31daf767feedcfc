//! The async job tracker.

use std::sync::Arc;

use tracing::{debug, info, warn};

use arthur_models::{GenerationInput, Job, JobId, JobKind, JobResult, JobState};
use arthur_providers::{GenerationProvider, ProviderRegistry, RemoteStatus};
use arthur_store::{CasOutcome, JobStore};

use crate::error::{TrackerError, TrackerResult};
use crate::metrics;
use crate::policy::PollPolicy;

/// Tracks generation jobs delegated to remote providers.
///
/// One uniform contract regardless of which remote API performs the
/// work: `submit` creates the remote job and the local record, `poll`
/// and `receive_webhook` reconcile the local record against the remote
/// status, and `wait_until_terminal` blocks the calling task until the
/// job settles.
///
/// All state lives behind the injected [`JobStore`]; the tracker itself
/// holds nothing mutable, so it can be shared freely across tasks.
pub struct AsyncJobTracker {
    store: Arc<dyn JobStore>,
    providers: ProviderRegistry,
}

impl AsyncJobTracker {
    pub fn new(store: Arc<dyn JobStore>, providers: ProviderRegistry) -> Self {
        Self { store, providers }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    fn provider_for(&self, kind: JobKind) -> TrackerResult<Arc<dyn GenerationProvider>> {
        self.providers
            .for_kind(kind)
            .ok_or(TrackerError::UnsupportedKind(kind))
    }

    /// Create a remote generation job and the local record tracking it.
    ///
    /// Validation runs before any network call; a remote rejection is
    /// surfaced with the remote status and body, and no local record is
    /// persisted on that path.
    pub async fn submit(&self, kind: JobKind, input: GenerationInput) -> TrackerResult<Job> {
        input.validate(kind)?;

        let provider = self.provider_for(kind)?;
        let created = provider.create(kind, &input).await?;

        let id = created
            .remote_id
            .map(JobId::from_string)
            .unwrap_or_default();

        // The provider may report immediate start, or even immediate
        // completion for cheap generations.
        let initial = provider.map_status(&created.status.raw);
        let job = Self::apply_status(Job::new(id, kind, input), initial, &created.status);

        self.store.put(&job).await?;
        metrics::record_job_submitted(kind.as_str(), provider.name());

        info!(
            job_id = %job.id,
            kind = %kind,
            provider = provider.name(),
            remote_status = %created.status.raw,
            "Submitted generation job"
        );

        Ok(job)
    }

    /// Fetch a job and reconcile it against the remote status.
    ///
    /// Terminal jobs are returned as stored, without a remote query. A
    /// failed status query is surfaced to the caller and leaves the
    /// record untouched: a transport problem polling a still-running
    /// remote job is not the remote job failing.
    pub async fn poll(&self, id: &JobId) -> TrackerResult<Job> {
        let job = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| TrackerError::not_found(id.to_string()))?;

        if job.is_terminal() {
            return Ok(job);
        }

        let provider = self.provider_for(job.kind)?;
        metrics::record_poll_attempt(provider.name());

        let status = provider.status(job.id.as_str()).await?;
        let next = provider.map_status(&status.raw);

        self.transition(job, next, &status).await
    }

    /// Repeatedly poll until the job settles or the budget runs out.
    ///
    /// A transient status-query error consumes an attempt at the
    /// current delay without backing off further; it never aborts the
    /// wait and never marks the job failed. Exhausting the budget fails
    /// with [`TrackerError::Timeout`], leaving the remote job running.
    pub async fn wait_until_terminal(
        &self,
        id: &JobId,
        policy: &PollPolicy,
    ) -> TrackerResult<Job> {
        let mut delay = policy.initial_delay;
        let mut attempts = 0u32;

        while attempts < policy.max_attempts {
            attempts += 1;

            match self.poll(id).await {
                Ok(job) if job.is_terminal() => return Ok(job),
                Ok(job) => {
                    debug!(
                        job_id = %id,
                        state = %job.state,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Job not yet terminal"
                    );
                    if attempts == policy.max_attempts {
                        break;
                    }
                    tokio::time::sleep(delay).await;
                    delay = policy.next_delay(delay);
                }
                Err(TrackerError::Remote(e)) if e.is_transient() => {
                    metrics::record_poll_transient_error("wait");
                    warn!(
                        job_id = %id,
                        attempt = attempts,
                        "Transient status-query failure, retrying: {}",
                        e
                    );
                    if attempts == policy.max_attempts {
                        break;
                    }
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(TrackerError::Timeout {
            job_id: id.clone(),
            attempts,
        })
    }

    /// Apply a provider push notification.
    ///
    /// Same state-mapping and idempotency rules as `poll`; payloads
    /// that do not identify a known job fail with `NotFound`.
    pub async fn receive_webhook(
        &self,
        provider_name: &str,
        payload: serde_json::Value,
    ) -> TrackerResult<Job> {
        let provider = self
            .providers
            .by_name(provider_name)
            .ok_or_else(|| TrackerError::not_found(format!("Unknown provider: {provider_name}")))?;

        let remote_id = provider
            .webhook_job_id(&payload)
            .ok_or_else(|| TrackerError::not_found("Webhook payload does not identify a job"))?;
        let id = JobId::from_string(remote_id);

        let job = self
            .store
            .get(&id)
            .await?
            .ok_or_else(|| TrackerError::not_found(id.to_string()))?;

        if job.is_terminal() {
            return Ok(job);
        }

        let status = provider.webhook_status(&payload)?;
        let next = provider.map_status(&status.raw);

        debug!(job_id = %id, remote_status = %status.raw, "Received webhook");
        self.transition(job, next, &status).await
    }

    /// Map a remote status onto the job, respecting forward-only
    /// transitions. Returns the job unchanged when the remote report is
    /// a no-op (still running) or would move backwards (a stale
    /// `queued` seen after the job already started).
    fn apply_status(job: Job, next: JobState, status: &RemoteStatus) -> Job {
        if !job.state.can_advance_to(next) {
            return job;
        }

        match next {
            JobState::Completed => job.complete(JobResult::from_artifacts(status.artifacts.clone())),
            JobState::Failed => job.fail(status.error.clone()),
            JobState::InProgress => job.start(),
            JobState::Pending => job,
        }
    }

    /// Persist a state change through the store's guarded write, so a
    /// terminal transition is applied at most once across concurrent
    /// polls and webhooks. The loser of a race gets the winner's record.
    async fn transition(
        &self,
        job: Job,
        next: JobState,
        status: &RemoteStatus,
    ) -> TrackerResult<Job> {
        let prev = job.state;
        let updated = Self::apply_status(job, next, status);

        if updated.state == prev {
            return Ok(updated);
        }

        match self.store.compare_and_swap(prev, &updated).await? {
            CasOutcome::Applied => {
                match updated.state {
                    JobState::Completed => {
                        metrics::record_job_completed(updated.kind.as_str());
                        info!(job_id = %updated.id, "Generation job completed");
                    }
                    JobState::Failed => {
                        metrics::record_job_failed(updated.kind.as_str());
                        info!(
                            job_id = %updated.id,
                            reason = updated.failure_reason.as_deref().unwrap_or(""),
                            "Generation job failed"
                        );
                    }
                    _ => {
                        debug!(job_id = %updated.id, state = %updated.state, "Job state advanced");
                    }
                }
                Ok(updated)
            }
            CasOutcome::Conflict(current) => {
                debug!(
                    job_id = %current.id,
                    state = %current.state,
                    "Lost transition race, returning stored record"
                );
                Ok(current)
            }
        }
    }
}
