//! Kind-specific generation parameters and their validation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::job::JobKind;

/// Validation failure raised before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} generation requires `{field}`")]
    MissingField { kind: JobKind, field: &'static str },

    #[error("`{field}` is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },
}

/// Parameters submitted to a remote generation provider.
///
/// One flat bag of optional fields shared across all job kinds; which
/// fields are required depends on the kind and is checked by
/// [`GenerationInput::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct GenerationInput {
    /// Text prompt (image, video, sound-effect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Source image for image-to-video generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Source video for lip-sync
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Source audio for lip-sync
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,

    /// Text to speak (text-to-speech)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Voice to use for text-to-speech; provider default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,

    /// Requested duration in seconds (sound-effect)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

impl GenerationInput {
    /// Check that the fields required for `kind` are present and that
    /// all URL fields parse. Runs before any network call; a failure
    /// here means no remote job was created.
    pub fn validate(&self, kind: JobKind) -> Result<(), ValidationError> {
        match kind {
            JobKind::Image => {
                require(kind, "prompt", &self.prompt)?;
            }
            JobKind::Video => {
                require(kind, "prompt", &self.prompt)?;
            }
            JobKind::Audio => {
                require(kind, "text", &self.text)?;
            }
            JobKind::SoundEffect => {
                require(kind, "prompt", &self.prompt)?;
            }
            JobKind::LipSync => {
                require(kind, "video_url", &self.video_url)?;
                require(kind, "audio_url", &self.audio_url)?;
            }
        }

        check_url("image_url", &self.image_url)?;
        check_url("video_url", &self.video_url)?;
        check_url("audio_url", &self.audio_url)?;

        Ok(())
    }
}

fn require(
    kind: JobKind,
    field: &'static str,
    value: &Option<String>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::MissingField { kind, field }),
    }
}

fn check_url(field: &'static str, value: &Option<String>) -> Result<(), ValidationError> {
    if let Some(v) = value {
        Url::parse(v).map_err(|_| ValidationError::InvalidUrl {
            field,
            value: v.clone(),
        })?;
    }
    Ok(())
}
