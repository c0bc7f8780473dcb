//! Reasoning-service client.
//!
//! `ReasoningService` is the seam between the session layer and the
//! external reasoner. `HttpExploreClient` talks to the service (or to the
//! explore proxy in front of it) over HTTP; tests substitute their own
//! implementations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::belief::BeliefSet;
use crate::error::{CheemeraError, TransportError, ValidationError};
use crate::property::Property;
use crate::result::ExploreResult;
use crate::wire::{ExploreRequest, EXPLORE_PATH};

/// Runs one explore query against a belief set.
pub trait ReasoningService: Send + Sync {
    /// Asks whether `properties` are jointly satisfiable against `belief_set`.
    fn explore(
        &self,
        belief_set: &BeliefSet,
        properties: &[Property],
    ) -> Result<ExploreResult, TransportError>;
}

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base url of the reasoning service (or proxy), without trailing path.
    pub base_url: String,
    /// Path of the explore endpoint under `base_url`.
    pub explore_path: String,
    /// Upper bound on one request, connect included.
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            explore_path: EXPLORE_PATH.to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl ClientConfig {
    /// Configuration for a service at `base_url` with default path and timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full url of the explore endpoint.
    #[must_use]
    pub fn explore_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.explore_path)
    }

    /// Checks the url scheme, the path and the timeout.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidServiceUrl {
            url: self.base_url.clone(),
            reason: reason.to_string(),
        };
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(invalid("scheme must be http or https"));
        }
        if !self.explore_path.starts_with('/') {
            return Err(invalid("explore path must start with '/'"));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Reasoning service reached over HTTP.
pub struct HttpExploreClient {
    config: ClientConfig,
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpExploreClient {
    /// Validates `config` and builds the underlying HTTP client.
    pub fn new(config: ClientConfig) -> Result<Self, CheemeraError> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CheemeraError::internal(format!("failed to create HTTP client: {e}")))?;
        let url = config.explore_url();

        Ok(Self { config, url, client })
    }

    /// Configuration the client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn send_error(&self, e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                duration_ms: self.config.timeout_ms,
            }
        } else {
            TransportError::Unreachable {
                message: e.to_string(),
            }
        }
    }
}

impl ReasoningService for HttpExploreClient {
    fn explore(
        &self,
        belief_set: &BeliefSet,
        properties: &[Property],
    ) -> Result<ExploreResult, TransportError> {
        let body = serde_json::to_vec(&ExploreRequest::new(belief_set, properties)).map_err(|e| {
            TransportError::SerializationFailed {
                message: e.to_string(),
            }
        })?;

        tracing::debug!(
            url = %self.url,
            belief_set = %belief_set.belief_set_name,
            properties = properties.len(),
            "sending explore request"
        );

        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| self.send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            // The body of a failed call is ignored, proxy error payload included.
            return Err(TransportError::Rejected {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|e| self.send_error(&e))?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::MalformedResponse {
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for HttpExploreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExploreClient")
            .field("url", &self.url)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish_non_exhaustive()
    }
}
