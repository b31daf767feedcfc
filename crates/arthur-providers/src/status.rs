//! Normalized remote status shapes shared by all adapters.

use std::collections::BTreeMap;

/// A provider's view of a job, normalized to the common shape every
/// adapter reports: the raw status string (mapped to a canonical state
/// by the owning adapter), any artifact URLs, and any failure reason.
#[derive(Debug, Clone, Default)]
pub struct RemoteStatus {
    /// Provider-specific status string, verbatim
    pub raw: String,
    /// Artifact URLs keyed by name, present once the remote job finished
    pub artifacts: BTreeMap<String, String>,
    /// Remote-reported failure reason, if any
    pub error: Option<String>,
}

impl RemoteStatus {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            ..Default::default()
        }
    }

    pub fn with_artifact(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.artifacts.insert(name.into(), url.into());
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

/// Result of a remote creation request.
#[derive(Debug, Clone)]
pub struct CreatedJob {
    /// Remote job id, when the provider issues one
    pub remote_id: Option<String>,
    /// Initial status reported in the creation response
    pub status: RemoteStatus,
}
