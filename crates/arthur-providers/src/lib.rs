//! Remote generation provider adapters.
//!
//! Every third-party generation API is wrapped behind the same minimal
//! contract: create a remote job, query its status, optionally normalize
//! a webhook payload. Each adapter owns its provider's request/response
//! types and its status-vocabulary mapping onto the four canonical job
//! states; everything above this crate speaks only [`RemoteStatus`] and
//! [`JobState`](arthur_models::JobState).

pub mod elevenlabs;
pub mod error;
mod http;
pub mod luma;
pub mod status;
pub mod synclabs;

use std::sync::Arc;

use async_trait::async_trait;

use arthur_models::{GenerationInput, JobKind, JobState};

pub use crate::elevenlabs::{ElevenLabsConfig, ElevenLabsProvider};
pub use crate::error::{ProviderError, ProviderResult};
pub use crate::luma::{LumaConfig, LumaProvider};
pub use crate::status::{CreatedJob, RemoteStatus};
pub use crate::synclabs::{SyncLabsConfig, SyncLabsProvider};

/// Contract every remote generation provider satisfies.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Stable adapter name, used for webhook routing and logging.
    fn name(&self) -> &'static str;

    /// Whether this adapter handles the given job kind.
    fn supports(&self, kind: JobKind) -> bool;

    /// Map this provider's raw status string onto a canonical state.
    ///
    /// Unrecognized statuses map to `InProgress`: the absence of a
    /// recognized terminal signal must never be reported as failure.
    fn map_status(&self, raw: &str) -> JobState;

    /// Issue the single remote creation request for a validated input.
    async fn create(&self, kind: JobKind, input: &GenerationInput) -> ProviderResult<CreatedJob>;

    /// Query the remote status of a previously created job.
    async fn status(&self, remote_id: &str) -> ProviderResult<RemoteStatus>;

    /// Extract the remote job id from a webhook payload, if present.
    fn webhook_job_id(&self, payload: &serde_json::Value) -> Option<String>;

    /// Normalize a webhook payload into a status update.
    fn webhook_status(&self, payload: &serde_json::Value) -> ProviderResult<RemoteStatus>;
}

/// Kind-indexed lookup over the configured provider adapters.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn GenerationProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the production registry from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(LumaProvider::from_env()?));
        registry.register(Arc::new(ElevenLabsProvider::from_env()?));
        registry.register(Arc::new(SyncLabsProvider::from_env()?));
        Ok(registry)
    }

    pub fn register(&mut self, provider: Arc<dyn GenerationProvider>) {
        self.providers.push(provider);
    }

    /// Find the adapter responsible for a job kind. First registered
    /// match wins.
    pub fn for_kind(&self, kind: JobKind) -> Option<Arc<dyn GenerationProvider>> {
        self.providers.iter().find(|p| p.supports(kind)).cloned()
    }

    /// Find an adapter by name (webhook routing).
    pub fn by_name(&self, name: &str) -> Option<Arc<dyn GenerationProvider>> {
        self.providers.iter().find(|p| p.name() == name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(LumaProvider::new(LumaConfig {
            api_key: "test".to_string(),
            ..Default::default()
        })
        .unwrap()));

        assert!(registry.for_kind(JobKind::Video).is_some());
        assert!(registry.for_kind(JobKind::Image).is_some());
        assert!(registry.for_kind(JobKind::LipSync).is_none());
        assert!(registry.by_name("luma").is_some());
        assert!(registry.by_name("synclabs").is_none());
    }
}
