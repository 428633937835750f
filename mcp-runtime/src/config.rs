//! Connection configuration for the remote Directus instance.
//!
//! Built once at startup and never mutated afterwards.

use std::fmt;

use crate::error::{Error, Result};

/// How the runtime proves its identity to Directus.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Static bearer token, sent on every request.
    Token(String),
    /// Email/password pair exchanged for a session at bootstrap.
    Login { email: String, password: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Token(_) => f.write_str("Token(<redacted>)"),
            Credential::Login { email, .. } => f
                .debug_struct("Login")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectusConfig {
    base_url: String,
    credential: Credential,
}

impl DirectusConfig {
    /// Validate raw settings. A token takes precedence over email/password;
    /// blank values count as absent.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        email: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::config("DIRECTUS_URL must not be empty"));
        }

        let credential = match (non_blank(token), non_blank(email), non_blank(password)) {
            (Some(token), _, _) => Credential::Token(token),
            (None, Some(email), Some(password)) => Credential::Login { email, password },
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(Error::config(
                    "DIRECTUS_EMAIL and DIRECTUS_PASSWORD must be provided together",
                ));
            }
            (None, None, None) => {
                return Err(Error::config(
                    "either DIRECTUS_TOKEN or DIRECTUS_EMAIL and DIRECTUS_PASSWORD must be provided",
                ));
            }
        };

        Ok(Self {
            base_url: base_url.to_string(),
            credential,
        })
    }

    pub fn with_token(base_url: &str, token: impl Into<String>) -> Result<Self> {
        Self::new(base_url, Some(token.into()), None, None)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = DirectusConfig::with_token("https://cms.example.com//", "tok").unwrap();
        assert_eq!(config.base_url(), "https://cms.example.com");
    }

    #[test]
    fn token_wins_over_login_pair() {
        let config =
            DirectusConfig::new("http://localhost", s("tok"), s("a@b.c"), s("pw")).unwrap();
        assert_eq!(config.credential(), &Credential::Token("tok".to_string()));
    }

    #[test]
    fn login_pair_is_accepted_without_token() {
        let config = DirectusConfig::new("http://localhost", None, s("a@b.c"), s("pw")).unwrap();
        assert!(matches!(config.credential(), Credential::Login { email, .. } if email == "a@b.c"));
    }

    #[test]
    fn missing_credentials_fail_immediately() {
        let err = DirectusConfig::new("http://localhost", None, None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = DirectusConfig::new("http://localhost", s("  "), None, s("pw")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(DirectusConfig::with_token(" / ", "tok").is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = DirectusConfig::new("http://localhost", None, s("a@b.c"), s("hunter2")).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("a@b.c"));
    }
}
