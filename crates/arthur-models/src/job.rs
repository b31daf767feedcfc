//! Generation job records and lifecycle states.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::input::GenerationInput;

/// Unique identifier for a generation job.
///
/// When the remote provider issues its own job id, that id is used
/// verbatim so later status queries can address the remote job directly.
/// Otherwise a random UUID is generated locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of generation delegated to a remote provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Still image generation
    Image,
    /// Video generation (text-to-video or image-to-video)
    Video,
    /// Text-to-speech audio
    Audio,
    /// Sound effect generation
    SoundEffect,
    /// Lip-sync a video against an audio track
    LipSync,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Image => "image",
            JobKind::Video => "video",
            JobKind::Audio => "audio",
            JobKind::SoundEffect => "sound-effect",
            JobKind::LipSync => "lip-sync",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a generation job.
///
/// Transitions are monotonic forward-only; `Completed` and `Failed` are
/// terminal and the record is immutable once either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Accepted by the remote provider but not yet started
    #[default]
    Pending,
    /// Remote provider is actively generating
    InProgress,
    /// Generation finished, artifacts available
    Completed,
    /// Remote provider reported a failure
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::InProgress => "in_progress",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more transitions occur).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Check whether a transition from `self` to `next` moves the
    /// lifecycle forward. Same-state "transitions" are not advances, and
    /// nothing leaves a terminal state.
    pub fn can_advance_to(&self, next: JobState) -> bool {
        match self {
            JobState::Pending => next != JobState::Pending,
            JobState::InProgress => next.is_terminal(),
            JobState::Completed | JobState::Failed => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Artifacts produced by a completed job, keyed by artifact name
/// (e.g. `video`, `image`, `audio`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(transparent)]
pub struct JobResult {
    pub artifacts: BTreeMap<String, String>,
}

impl JobResult {
    /// Build a result from named artifact URLs.
    pub fn from_artifacts(artifacts: BTreeMap<String, String>) -> Self {
        Self { artifacts }
    }

    /// Build a result holding a single artifact.
    pub fn single(name: impl Into<String>, url: impl Into<String>) -> Self {
        let mut artifacts = BTreeMap::new();
        artifacts.insert(name.into(), url.into());
        Self { artifacts }
    }

    /// Look up an artifact URL by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.artifacts.get(name).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// A generation job delegated to a remote provider and tracked locally
/// until it reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID (remote id when the provider issues one)
    pub id: JobId,

    /// What is being generated
    pub kind: JobKind,

    /// Parameters submitted to the remote provider; immutable after creation
    pub input: GenerationInput,

    /// Current lifecycle state
    #[serde(default)]
    pub state: JobState,

    /// Artifact URLs; present only when `state` is `completed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,

    /// Human-readable failure reason; present only when `state` is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp; bumps on every state transition
    pub updated_at: DateTime<Utc>,
}

/// Fallback reason recorded when a provider reports failure without one.
pub const UNKNOWN_FAILURE_REASON: &str = "Unknown error";

impl Job {
    /// Create a new job in the `Pending` state.
    pub fn new(id: JobId, kind: JobKind, input: GenerationInput) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            input,
            state: JobState::Pending,
            result: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the job as started by the remote provider.
    pub fn start(mut self) -> Self {
        if self.state == JobState::Pending {
            self.state = JobState::InProgress;
            self.updated_at = Utc::now();
        }
        self
    }

    /// Mark the job as completed with its artifacts.
    pub fn complete(mut self, result: JobResult) -> Self {
        if !self.state.is_terminal() {
            self.state = JobState::Completed;
            self.result = Some(result);
            self.updated_at = Utc::now();
        }
        self
    }

    /// Mark the job as failed with the remote-reported reason.
    pub fn fail(mut self, reason: Option<String>) -> Self {
        if !self.state.is_terminal() {
            self.state = JobState::Failed;
            self.failure_reason =
                Some(reason.unwrap_or_else(|| UNKNOWN_FAILURE_REASON.to_string()));
            self.updated_at = Utc::now();
        }
        self
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_input() -> GenerationInput {
        GenerationInput {
            prompt: Some("Create a cinematic video".to_string()),
            image_url: Some("https://x/img.png".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_job_creation() {
        let job = Job::new(JobId::from_string("abc"), JobKind::Video, video_input());

        assert_eq!(job.state, JobState::Pending);
        assert!(job.result.is_none());
        assert!(job.failure_reason.is_none());
        assert_eq!(job.created_at, job.updated_at);
    }

    #[test]
    fn test_job_state_transitions() {
        let job = Job::new(JobId::new(), JobKind::Video, video_input());

        let started = job.start();
        assert_eq!(started.state, JobState::InProgress);

        let completed = started.complete(JobResult::single("video", "https://x/out.mp4"));
        assert_eq!(completed.state, JobState::Completed);
        assert_eq!(
            completed.result.as_ref().and_then(|r| r.get("video")),
            Some("https://x/out.mp4")
        );
        assert!(completed.failure_reason.is_none());
    }

    #[test]
    fn test_terminal_jobs_are_immutable() {
        let job = Job::new(JobId::new(), JobKind::Image, GenerationInput::default());
        let failed = job.fail(Some("provider exploded".to_string()));
        assert_eq!(failed.state, JobState::Failed);

        // No transition leaves a terminal state.
        let still_failed = failed.clone().complete(JobResult::single("image", "u"));
        assert_eq!(still_failed.state, JobState::Failed);
        assert!(still_failed.result.is_none());

        let restarted = failed.start();
        assert_eq!(restarted.state, JobState::Failed);
    }

    #[test]
    fn test_fail_defaults_reason() {
        let job = Job::new(JobId::new(), JobKind::Audio, GenerationInput::default());
        let failed = job.fail(None);
        assert_eq!(failed.failure_reason.as_deref(), Some(UNKNOWN_FAILURE_REASON));
    }

    #[test]
    fn test_state_advancement_rules() {
        assert!(JobState::Pending.can_advance_to(JobState::InProgress));
        assert!(JobState::Pending.can_advance_to(JobState::Completed));
        assert!(JobState::InProgress.can_advance_to(JobState::Failed));

        // No-op and backward transitions are not advances.
        assert!(!JobState::InProgress.can_advance_to(JobState::InProgress));
        assert!(!JobState::InProgress.can_advance_to(JobState::Pending));
        assert!(!JobState::Completed.can_advance_to(JobState::Failed));
        assert!(!JobState::Failed.can_advance_to(JobState::InProgress));
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&JobKind::SoundEffect).unwrap(),
            "\"sound-effect\""
        );
        assert_eq!(
            serde_json::from_str::<JobKind>("\"lip-sync\"").unwrap(),
            JobKind::LipSync
        );
    }
}
