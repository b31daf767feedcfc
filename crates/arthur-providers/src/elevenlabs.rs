//! ElevenLabs adapter (text-to-speech and sound effects).

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

/// Voice used when the caller does not pick one.
const DEFAULT_VOICE_ID: &str = "EXAVITQu4vr4xnSDxMaL";

/// Configuration for the ElevenLabs adapter.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// Base URL of the ElevenLabs API
    pub base_url: String,
    /// API key (xi-api-key header)
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Default voice for text-to-speech
    pub default_voice_id: String,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io/v1".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            default_voice_id: DEFAULT_VOICE_ID.to_string(),
        }
    }
}

impl ElevenLabsConfig {
    /// Create config from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .map_err(|_| ProviderError::NotConfigured("ELEVENLABS_API_KEY not set".to_string()))?;

        Ok(Self {
            base_url: std::env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io/v1".to_string()),
            api_key,
            timeout: Duration::from_secs(
                std::env::var("ELEVENLABS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            default_voice_id: std::env::var("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|_| DEFAULT_VOICE_ID.to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct SoundEffectRequest {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RequestResponse {
    request_id: String,
    status: String,
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl RequestResponse {
    fn into_remote_status(self) -> RemoteStatus {
        let mut status = RemoteStatus::new(self.status).with_error(self.error);
        if let Some(audio) = self.audio_url {
            status = status.with_artifact("audio", audio);
        }
        status
    }
}

/// Adapter for the ElevenLabs audio generation API.
pub struct ElevenLabsProvider {
    http: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsProvider {
    /// Create a new ElevenLabs adapter.
    pub fn new(config: ElevenLabsConfig) -> ProviderResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ProviderError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ProviderResult<Self> {
        Self::new(ElevenLabsConfig::from_env()?)
    }
}

#[async_trait]
impl GenerationProvider for ElevenLabsProvider {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn supports(&self, kind: JobKind) -> bool {
        matches!(kind, JobKind::Audio | JobKind::SoundEffect)
    }

    fn map_status(&self, raw: &str) -> JobState {
        match raw {
            "created" => JobState::Pending,
            "processing" => JobState::InProgress,
            "done" => JobState::Completed,
            "error" => JobState::Failed,
            _ => JobState::InProgress,
        }
    }

    async fn create(&self, kind: JobKind, input: &GenerationInput) -> ProviderResult<CreatedJob> {
        let response = match kind {
            JobKind::SoundEffect => {
                let url = format!("{}/sound-generation/request", self.config.base_url);
                debug!("Creating ElevenLabs sound effect");
                self.http
                    .post(&url)
                    .header("xi-api-key", &self.config.api_key)
                    .json(&SoundEffectRequest {
                        text: input.prompt.clone().unwrap_or_default(),
                        duration_seconds: input.duration_seconds,
                    })
                    .send()
                    .await?
            }
            _ => {
                let voice = input
                    .voice_id
                    .as_deref()
                    .unwrap_or(&self.config.default_voice_id);
                let url = format!("{}/text-to-speech/{}/request", self.config.base_url, voice);
                debug!("Creating ElevenLabs speech request (voice={})", voice);
                self.http
                    .post(&url)
                    .header("xi-api-key", &self.config.api_key)
                    .json(&SpeechRequest {
                        text: input.text.clone().unwrap_or_default(),
                    })
                    .send()
                    .await?
            }
        };

        let request: RequestResponse = read_json(response).await?;

        Ok(CreatedJob {
            remote_id: Some(request.request_id.clone()),
            status: request.into_remote_status(),
        })
    }

    async fn status(&self, remote_id: &str) -> ProviderResult<RemoteStatus> {
        let url = format!("{}/requests/{}", self.config.base_url, remote_id);

        let response = self
            .http
            .get(&url)
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await?;

        let request: RequestResponse = read_json(response).await?;
        Ok(request.into_remote_status())
    }

    fn webhook_job_id(&self, payload: &serde_json::Value) -> Option<String> {
        payload
            .get("request_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    fn webhook_status(&self, payload: &serde_json::Value) -> ProviderResult<RemoteStatus> {
        let parsed: RequestResponse = serde_json::from_value(payload.clone())
            .map_err(|e| ProviderError::invalid_response(format!("ElevenLabs webhook: {}", e)))?;
        Ok(parsed.into_remote_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> ElevenLabsProvider {
        ElevenLabsProvider::new(ElevenLabsConfig {
            base_url,
            api_key: "test-key".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_status_vocabulary() {
        let eleven = provider("http://localhost".to_string());
        assert_eq!(eleven.map_status("created"), JobState::Pending);
        assert_eq!(eleven.map_status("processing"), JobState::InProgress);
        assert_eq!(eleven.map_status("done"), JobState::Completed);
        assert_eq!(eleven.map_status("error"), JobState::Failed);
        assert_eq!(eleven.map_status("queued_for_gpu"), JobState::InProgress);
    }

    #[tokio::test]
    async fn test_create_speech_uses_default_voice() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/text-to-speech/{}/request", DEFAULT_VOICE_ID)))
            .and(header("xi-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "request_id": "req-1",
                "status": "created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let eleven = provider(server.uri());
        let input = GenerationInput {
            text: Some("Hello there".to_string()),
            ..Default::default()
        };

        let created = eleven.create(JobKind::Audio, &input).await.unwrap();
        assert_eq!(created.remote_id.as_deref(), Some("req-1"));
    }

    #[tokio::test]
    async fn test_sound_effect_completion() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/requests/req-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "request_id": "req-2",
                "status": "done",
                "audio_url": "https://x/boom.mp3"
            })))
            .mount(&server)
            .await;

        let eleven = provider(server.uri());
        let status = eleven.status("req-2").await.unwrap();
        assert_eq!(status.raw, "done");
        assert_eq!(status.artifacts.get("audio").map(String::as_str), Some("https://x/boom.mp3"));
    }
}
