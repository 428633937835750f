//! HTTP client for the Directus REST API.
//!
//! Every response is normalized into one of: the parsed JSON body, a
//! synthetic success marker (204 / empty body), or [`Error::Api`].

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use crate::auth::{AuthState, authenticate};
use crate::config::DirectusConfig;
use crate::error::{Error, Result};

/// Cheap to clone; clones share the same immutable connection state.
#[derive(Clone, Debug)]
pub struct DirectusClient {
    http: reqwest::Client,
    state: Arc<ClientState>,
}

#[derive(Debug)]
struct ClientState {
    base_url: String,
    auth: AuthState,
}

impl DirectusClient {
    /// Resolve credentials and return a ready client. Session credentials
    /// trigger a login round-trip; a static token does not touch the network.
    pub async fn connect(config: &DirectusConfig) -> Result<Self> {
        let http = reqwest::Client::new();
        let anonymous = Self::from_parts(http.clone(), config.base_url(), AuthState::Anonymous);
        let auth = authenticate(&anonymous, config.credential()).await?;
        tracing::info!(
            base_url = config.base_url(),
            auth = ?auth,
            "Directus client ready"
        );
        Ok(Self::from_parts(http, config.base_url(), auth))
    }

    fn from_parts(http: reqwest::Client, base_url: &str, auth: AuthState) -> Self {
        Self {
            http,
            state: Arc::new(ClientState {
                base_url: base_url.to_string(),
                auth,
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.state.base_url
    }

    pub fn auth(&self) -> &AuthState {
        &self.state.auth
    }

    /// Issue `method` against `base_url + path`. `path` already carries any
    /// query string.
    ///
    /// The body is only sent for POST and PATCH, and for DELETE when it is an
    /// array of ids (bulk delete).
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.state.base_url, path);
        tracing::debug!(method = %method, path, "Directus request");

        let mut request = self
            .http
            .request(method.clone(), url.as_str())
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.state.auth.bearer() {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body.filter(|body| sends_body(&method, body)) {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(method = %method, path, error = %e, "Directus unreachable");
            Error::api(None, e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(success_marker());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::api(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            let message = remote_error_message(&bytes).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
            tracing::warn!(
                method = %method,
                path,
                status = status.as_u16(),
                message = %message,
                "Directus request failed"
            );
            return Err(Error::api(Some(status.as_u16()), message));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(success_marker());
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            Error::api(
                Some(status.as_u16()),
                format!("Invalid JSON in response body: {e}"),
            )
        })
    }
}

/// Returned in place of a body for 204 and empty successful responses.
pub fn success_marker() -> Value {
    json!({ "success": true })
}

fn sends_body(method: &Method, body: &Value) -> bool {
    if *method == Method::POST || *method == Method::PATCH {
        true
    } else {
        *method == Method::DELETE && body.is_array()
    }
}

/// `errors[0].message`, then top-level `message`.
fn remote_error_message(bytes: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(bytes).ok()?;
    body.pointer("/errors/0/message")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .map(str::to_string)
}
