//! Provider error types.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Provider returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether a failed status query may be retried. A transient
    /// transport or server-side failure says nothing about the remote
    /// job itself, so callers keep polling; a 4xx means the query is
    /// wrong and repeating it cannot help.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Network(_) => true,
            ProviderError::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Remote { status: 500, body: String::new() }.is_transient());
        assert!(ProviderError::Remote { status: 429, body: String::new() }.is_transient());
        assert!(!ProviderError::Remote { status: 404, body: String::new() }.is_transient());
        assert!(!ProviderError::InvalidResponse("bad".into()).is_transient());
    }
}
