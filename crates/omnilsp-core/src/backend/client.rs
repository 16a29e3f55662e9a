//! HTTP client for the OmniSharp backend.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::backend::types::{AutocompleteCandidate, AutocompleteRequest, CompletionQuery};
use crate::config::BackendConfig;
use crate::error::{Error, Result};

/// Source of completion candidates for the gateway.
///
/// Seams the gateway off the concrete HTTP client so handlers can be tested
/// against a stub backend.
#[async_trait]
pub trait CompletionBackend: Send + Sync + 'static {
    /// Resolve a completion query into backend candidates, order preserved.
    async fn completion(&self, query: &CompletionQuery) -> Result<Vec<AutocompleteCandidate>>;
}

/// Stateless HTTP client for the OmniSharp API.
///
/// Holds no per-request state; cloning shares the underlying connection
/// pool, so concurrent handlers block independently on their own calls.
#[derive(Debug, Clone)]
pub struct OmniSharpClient {
    base_url: String,
    timeout_seconds: u64,
    client: reqwest::Client,
}

impl OmniSharpClient {
    /// Build a client for the configured backend.
    ///
    /// The request timeout is baked into the underlying HTTP client so
    /// every call carries an explicit deadline.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_seconds: config.timeout_seconds,
            client,
        })
    }

    /// Base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON payload to `{base_url}{endpoint}` and return the raw
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns `Error::Timeout` when the deadline elapses,
    /// `Error::Transport` on connection failure, non-success status, or a
    /// failed body read. Does not retry.
    pub async fn send_request<T: Serialize + Sync>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, "sending backend request");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(format!(
                "backend returned HTTP {status} for {url}"
            )));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok(body.to_vec())
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.timeout_seconds)
        } else {
            Error::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl CompletionBackend for OmniSharpClient {
    async fn completion(&self, query: &CompletionQuery) -> Result<Vec<AutocompleteCandidate>> {
        let payload = AutocompleteRequest::from(query);
        let body = self.send_request("/autocomplete", &payload).await?;

        let candidates: Vec<AutocompleteCandidate> = serde_json::from_slice(&body)
            .map_err(|e| Error::Decode(format!("backend response is not a candidate array: {e}")))?;

        debug!(count = candidates.len(), file = %query.file_name, "backend returned candidates");
        Ok(candidates)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> BackendConfig {
        BackendConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let client = OmniSharpClient::new(&test_config("http://localhost:2000/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:2000");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // Port 1 on localhost refuses connections.
        let client = OmniSharpClient::new(&test_config("http://127.0.0.1:1")).unwrap();
        let query = CompletionQuery {
            file_name: "Foo.cs".to_string(),
            line: 0,
            column: 0,
        };

        let err = client.completion(&query).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got: {err}");
    }
}
