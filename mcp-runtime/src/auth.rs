//! Authentication bootstrap.
//!
//! A static token is usable immediately. An email/password pair is exchanged
//! for a session through `POST /auth/login` before the client is handed out;
//! a rejected login aborts startup.

use std::fmt;

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use crate::client::DirectusClient;
use crate::config::Credential;
use crate::error::{Error, Result};

/// Resolved authentication, fixed for the lifetime of the process.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Used only for the login exchange itself.
    Anonymous,
    StaticToken(String),
    Session { access_token: String },
}

impl AuthState {
    /// Value for the `Authorization` header, if any.
    pub fn bearer(&self) -> Option<&str> {
        match self {
            AuthState::Anonymous => None,
            AuthState::StaticToken(token) => Some(token),
            AuthState::Session { access_token } => Some(access_token),
        }
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::Anonymous => f.write_str("Anonymous"),
            AuthState::StaticToken(_) => f.write_str("StaticToken(<redacted>)"),
            AuthState::Session { .. } => f.write_str("Session(<redacted>)"),
        }
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Deserialize)]
struct LoginData {
    access_token: String,
}

/// Resolve a credential into a ready-to-use auth state.
///
/// `anonymous` must be a client built without credentials against the same
/// base URL; it performs the login exchange.
pub(crate) async fn authenticate(
    anonymous: &DirectusClient,
    credential: &Credential,
) -> Result<AuthState> {
    match credential {
        Credential::Token(token) => Ok(AuthState::StaticToken(token.clone())),
        Credential::Login { email, password } => {
            tracing::debug!(email = %email, "logging in to Directus");
            let body = json!({ "email": email, "password": password, "mode": "json" });
            let response = anonymous
                .request(Method::POST, "/auth/login", Some(&body))
                .await
                .map_err(|err| Error::Auth(login_failure_message(err)))?;
            let parsed: LoginResponse = serde_json::from_value(response).map_err(|_| {
                Error::Auth("login response did not contain an access token".to_string())
            })?;
            Ok(AuthState::Session {
                access_token: parsed.data.access_token,
            })
        }
    }
}

fn login_failure_message(err: Error) -> String {
    match err {
        Error::Api { message, .. } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_is_absent_only_for_anonymous() {
        assert_eq!(AuthState::Anonymous.bearer(), None);
        assert_eq!(AuthState::StaticToken("t".into()).bearer(), Some("t"));
        let session = AuthState::Session {
            access_token: "s".into(),
        };
        assert_eq!(session.bearer(), Some("s"));
        assert_eq!(format!("{session:?}"), "Session(<redacted>)");
    }
}
