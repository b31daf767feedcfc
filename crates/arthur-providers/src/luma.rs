//! Luma Dream Machine adapter (image and video generation).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use arthur_models::{GenerationInput, JobKind, JobState};

use crate::error::{ProviderError, ProviderResult};
use crate::http::read_json;
use crate::status::{CreatedJob, RemoteStatus};
use crate::GenerationProvider;

/// Configuration for the Luma adapter.
#[derive(Debug, Clone)]
pub struct LumaConfig {
    /// Base URL of the Dream Machine API
    pub base_url: String,
    /// API key (Bearer token)
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for LumaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lumalabs.ai/dream-machine/v1".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl LumaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = std::env::var("LUMA_API_KEY")
            .map_err(|_| ProviderError::NotConfigured("LUMA_API_KEY not set".to_string()))?;

        Ok(Self {
            base_url: std::env::var("LUMA_BASE_URL")
                .unwrap_or_else(|_| "https://api.lumalabs.ai/dream-machine/v1".to_string()),
            api_key,
            timeout: Duration::from_secs(
                std::env::var("LUMA_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerationRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyframes: Option<Keyframes>,
}

#[derive(Debug, Serialize)]
struct Keyframes {
    frame0: Keyframe,
}

#[derive(Debug, Serialize)]
struct Keyframe {
    #[serde(rename = "type")]
    kind: &'static str,
    url: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    id: String,
    state: String,
    #[serde(default)]
    assets: Option<Assets>,
    #[serde(default)]
    failure_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Assets {
    #[serde(default)]
    video: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

impl GenerationResponse {
    fn into_remote_status(self) -> RemoteStatus {
        let mut status = RemoteStatus::new(self.state).with_error(self.failure_reason);
        if let Some(assets) = self.assets {
            if let Some(video) = assets.video {
                status = status.with_artifact("video", video);
            }
            if let Some(image) = assets.image {
                status = status.with_artifact("image", image);
            }
        }
        status
    }
}

/// Adapter for the Luma Dream Machine generation API.
pub struct LumaProvider {
    http: Client,
    config: LumaConfig,
}

impl LumaProvider {
    /// Create a new Luma adapter.
    pub fn new(config: LumaConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(LumaConfig::from_env()?)
    }

    fn create_url(&self, kind: JobKind) -> String {
        match kind {
            JobKind::Image => format!("{}/generations/image", self.config.base_url),
            _ => format!("{}/generations", self.config.base_url),
        }
    }
}

#[async_trait]
impl GenerationProvider for LumaProvider {
    fn name(&self) -> &'static str {
        "luma"
    }

    fn supports(&self, kind: JobKind) -> bool {
        matches!(kind, JobKind::Image | JobKind::Video)
    }

    fn map_status(&self, raw: &str) -> JobState {
        match raw {
            "queued" => JobState::Pending,
            "dreaming" => JobState::InProgress,
            "completed" => JobState::Completed,
            "failed" => JobState::Failed,
            // Anything unrecognized is still running until Luma says otherwise.
            _ => JobState::InProgress,
        }
    }

    async fn create(&self, kind: JobKind, input: &GenerationInput) -> ProviderResult<CreatedJob> {
        let prompt = input.prompt.clone().unwrap_or_default();
        let keyframes = input.image_url.as_ref().map(|url| Keyframes {
            frame0: Keyframe {
                kind: "image",
                url: url.clone(),
            },
        });

        let url = self.create_url(kind);
        debug!("Creating Luma {} generation", kind);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&GenerationRequest { prompt, keyframes })
            .send()
            .await?;

        let generation: GenerationResponse = read_json(response).await?;

        Ok(CreatedJob {
            remote_id: Some(generation.id.clone()),
            status: generation.into_remote_status(),
        })
    }

    async fn status(&self, remote_id: &str) -> ProviderResult<RemoteStatus> {
        let url = format!("{}/generations/{}", self.config.base_url, remote_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let generation: GenerationResponse = read_json(response).await?;
        Ok(generation.into_remote_status())
    }

    fn webhook_job_id(&self, payload: &serde_json::Value) -> Option<String> {
        // Luma posts the generation object itself; some webhook
        // configurations nest it under "generation".
        payload
            .get("id")
            .or_else(|| payload.get("generation").and_then(|g| g.get("id")))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    fn webhook_status(&self, payload: &serde_json::Value) -> ProviderResult<RemoteStatus> {
        let generation = payload.get("generation").unwrap_or(payload);
        let parsed: GenerationResponse = serde_json::from_value(generation.clone())
            .map_err(|e| ProviderError::invalid_response(format!("Luma webhook: {}", e)))?;
        Ok(parsed.into_remote_status())
    }
}
