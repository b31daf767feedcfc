//! Sync Labs adapter (lip-sync generation).

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

/// Configuration for the Sync Labs adapter.
#[derive(Debug, Clone)]
pub struct SyncLabsConfig {
    /// Base URL of the Sync Labs API
    pub base_url: String,
    /// API key (x-api-key header)
    pub api_key: String,
    /// Lip-sync model name
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for SyncLabsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sync.so/v2".to_string(),
            api_key: String::new(),
            model: "lipsync-2".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SyncLabsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = std::env::var("SYNCLABS_API_KEY")
            .map_err(|_| ProviderError::NotConfigured("SYNCLABS_API_KEY not set".to_string()))?;

        Ok(Self {
            base_url: std::env::var("SYNCLABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.sync.so/v2".to_string()),
            api_key,
            model: std::env::var("SYNCLABS_MODEL").unwrap_or_else(|_| "lipsync-2".to_string()),
            timeout: Duration::from_secs(
                std::env::var("SYNCLABS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    input: Vec<GenerateInput>,
}

#[derive(Debug, Serialize)]
struct GenerateInput {
    #[serde(rename = "type")]
    kind: &'static str,
    url: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    id: String,
    status: String,
    #[serde(default, rename = "outputUrl")]
    output_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GenerateResponse {
    fn into_remote_status(self) -> RemoteStatus {
        let mut status = RemoteStatus::new(self.status).with_error(self.error);
        if let Some(output) = self.output_url {
            status = status.with_artifact("video", output);
        }
        status
    }
}

/// Adapter for the Sync Labs lip-sync API.
pub struct SyncLabsProvider {
    http: Client,
    config: SyncLabsConfig,
}

impl SyncLabsProvider {
    /// Create a new Sync Labs adapter.
    pub fn new(config: SyncLabsConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(SyncLabsConfig::from_env()?)
    }
}

#[async_trait]
impl GenerationProvider for SyncLabsProvider {
    fn name(&self) -> &'static str {
        "synclabs"
    }

    fn supports(&self, kind: JobKind) -> bool {
        matches!(kind, JobKind::LipSync)
    }

    fn map_status(&self, raw: &str) -> JobState {
        match raw {
            "PENDING" => JobState::Pending,
            "PROCESSING" => JobState::InProgress,
            "COMPLETED" => JobState::Completed,
            "FAILED" | "REJECTED" | "TIMED_OUT" => JobState::Failed,
            _ => JobState::InProgress,
        }
    }

    async fn create(&self, _kind: JobKind, input: &GenerationInput) -> ProviderResult<CreatedJob> {
        let url = format!("{}/generate", self.config.base_url);
        debug!("Creating Sync Labs lip-sync generation");

        let request = GenerateRequest {
            model: self.config.model.clone(),
            input: vec![
                GenerateInput {
                    kind: "video",
                    url: input.video_url.clone().unwrap_or_default(),
                },
                GenerateInput {
                    kind: "audio",
                    url: input.audio_url.clone().unwrap_or_default(),
                },
            ],
        };

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let generation: GenerateResponse = read_json(response).await?;

        Ok(CreatedJob {
            remote_id: Some(generation.id.clone()),
            status: generation.into_remote_status(),
        })
    }

    async fn status(&self, remote_id: &str) -> ProviderResult<RemoteStatus> {
        let url = format!("{}/generate/{}", self.config.base_url, remote_id);

        let response = self
            .http
            .get(&url)
            .header("x-api-key", &self.config.api_key)
            .send()
            .await?;

        let generation: GenerateResponse = read_json(response).await?;
        Ok(generation.into_remote_status())
    }

    fn webhook_job_id(&self, payload: &serde_json::Value) -> Option<String> {
        payload
            .get("id")
            .or_else(|| payload.get("result").and_then(|r| r.get("id")))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    fn webhook_status(&self, payload: &serde_json::Value) -> ProviderResult<RemoteStatus> {
        let result = payload.get("result").unwrap_or(payload);
        let parsed: GenerateResponse = serde_json::from_value(result.clone())
            .map_err(|e| ProviderError::invalid_response(format!("Sync Labs webhook: {}", e)))?;
        Ok(parsed.into_remote_status())
    }
}
