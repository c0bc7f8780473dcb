//! Explore proxy.
//!
//! Front-ends post explore requests here instead of reaching the
//! reasoning service directly. The request JSON is forwarded untouched
//! (apart from a `properties` key renamed to `explore`) to
//! `<upstream>/exploreBeliefSet`; a successful upstream body is returned
//! as-is, and any failure becomes HTTP 500 with `{ "error": ... }`.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CheemeraError, TransportError};
use crate::wire::{ProxyErrorBody, EXPLORE_PATH, PROXY_EXPLORE_PATH};

const BELIEF_SET_FIELD: &str = "beliefSet";
const EXPLORE_FIELD: &str = "explore";
const PROPERTIES_ALIAS: &str = "properties";

/// Proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address to listen on.
    pub bind: SocketAddr,
    /// Base url of the reasoning service.
    pub upstream: String,
    /// Upper bound on one upstream call.
    pub timeout_ms: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upstream: "http://localhost:3001".to_string(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone)]
struct ProxyState {
    client: reqwest::Client,
    upstream_url: String,
}

/// Builds the proxy's router.
pub fn router(config: &ProxyConfig) -> Result<Router, CheemeraError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|e| CheemeraError::internal(format!("failed to create HTTP client: {e}")))?;
    let state = ProxyState {
        client,
        upstream_url: format!("{}{}", config.upstream.trim_end_matches('/'), EXPLORE_PATH),
    };

    Ok(Router::new()
        .route(PROXY_EXPLORE_PATH, post(explore))
        .with_state(state))
}

/// Serves the proxy until `shutdown` resolves.
pub async fn serve<F>(config: ProxyConfig, shutdown: F) -> Result<(), CheemeraError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = router(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| CheemeraError::internal(format!("failed to bind {}: {e}", config.bind)))?;
    tracing::info!(bind = %config.bind, upstream = %config.upstream, "explore proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CheemeraError::internal(format!("proxy server error: {e}")))
}

async fn explore(State(state): State<ProxyState>, body: Bytes) -> Response {
    match forward(&state, &body).await {
        Ok(upstream_body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            upstream_body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "explore proxy call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProxyErrorBody::upstream_failure()),
            )
                .into_response()
        }
    }
}

async fn forward(state: &ProxyState, body: &[u8]) -> Result<Bytes, TransportError> {
    let request = normalize_request(body)?;
    tracing::debug!(
        properties = request[EXPLORE_FIELD].as_array().map_or(0, Vec::len),
        "forwarding explore request"
    );

    let response = state
        .client
        .post(&state.upstream_url)
        .json(&request)
        .send()
        .await
        .map_err(|e| TransportError::Unreachable {
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Rejected {
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| TransportError::Unreachable {
            message: e.to_string(),
        })?;
    serde_json::from_slice::<Value>(&bytes).map_err(|e| TransportError::MalformedResponse {
        message: e.to_string(),
    })?;
    Ok(bytes)
}

/// Parses the incoming body as untyped JSON so it reaches the reasoning
/// service as sent. Only a top-level `properties` key is renamed to
/// `explore`; the request must be an object carrying both fields.
fn normalize_request(body: &[u8]) -> Result<Value, TransportError> {
    let invalid = |message: String| TransportError::SerializationFailed { message };

    let mut request: Value = serde_json::from_slice(body).map_err(|e| invalid(e.to_string()))?;
    let Some(fields) = request.as_object_mut() else {
        return Err(invalid("explore request must be a JSON object".to_string()));
    };
    if !fields.contains_key(EXPLORE_FIELD) {
        if let Some(properties) = fields.remove(PROPERTIES_ALIAS) {
            fields.insert(EXPLORE_FIELD.to_string(), properties);
        }
    }
    if !fields.get(BELIEF_SET_FIELD).is_some_and(Value::is_object) {
        return Err(invalid(format!("missing `{BELIEF_SET_FIELD}` object")));
    }
    if !fields.get(EXPLORE_FIELD).is_some_and(Value::is_array) {
        return Err(invalid(format!("missing `{EXPLORE_FIELD}` array")));
    }
    Ok(request)
}
