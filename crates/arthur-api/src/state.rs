//! Application state.

use std::sync::Arc;

use arthur_providers::ProviderRegistry;
use arthur_store::{JobStore, MemoryJobStore, RedisJobStore};
use arthur_tracker::{AsyncJobTracker, PollPolicy};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn JobStore>,
    pub tracker: Arc<AsyncJobTracker>,
    pub poll_policy: PollPolicy,
}

impl AppState {
    /// Create application state from the environment.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store: Arc<dyn JobStore> = match config.store_backend.as_str() {
            "redis" => Arc::new(RedisJobStore::from_env()?),
            _ => Arc::new(MemoryJobStore::new()),
        };

        let providers = ProviderRegistry::from_env()?;

        Ok(Self::from_parts(config, store, providers))
    }

    /// Assemble state from pre-built parts. Used by tests to inject an
    /// in-memory store and stub providers.
    pub fn from_parts(
        config: ApiConfig,
        store: Arc<dyn JobStore>,
        providers: ProviderRegistry,
    ) -> Self {
        let tracker = Arc::new(AsyncJobTracker::new(Arc::clone(&store), providers));

        Self {
            config,
            store,
            tracker,
            poll_policy: PollPolicy::from_env(),
        }
    }
}
