//! Shared response handling for adapter HTTP calls.

use serde::de::DeserializeOwned;

use crate::error::{ProviderError, ProviderResult};

/// Parse a JSON response body, turning any non-success status into a
/// `Remote` error carrying the remote status code and body verbatim.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ProviderResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Remote {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}
