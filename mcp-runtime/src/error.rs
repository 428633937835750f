//! Error types shared by the client, the tool layer and the stdio server.

use thiserror::Error;

use crate::toolset::Toolset;

/// Runtime result type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or contradictory startup configuration. Fatal.
    #[error("configuration error: {0}")]
    Config(String),

    /// Session login rejected during bootstrap. Fatal.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Tool arguments rejected by the input validator. Each entry reads
    /// `<field>: <reason>`.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// Remote service answered with a failure, or could not be reached at all
    /// (`status` is `None` in that case).
    #[error("Directus API error: {message}")]
    Api { status: Option<u16>, message: String },

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// The tool exists but none of its toolsets is active.
    #[error(
        "Tool '{tool}' is not enabled. It requires one of the toolsets [{}], active toolsets are [{}]",
        join_toolsets(required),
        join_toolsets(active)
    )]
    ToolNotEnabled {
        tool: String,
        required: Vec<Toolset>,
        active: Vec<Toolset>,
    },

    /// Tool catalogue inconsistency detected while registering.
    #[error("registry error: {0}")]
    Registry(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn api(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }

    pub fn validation(violation: impl Into<String>) -> Self {
        Self::Validation(vec![violation.into()])
    }

    /// HTTP status attached to a remote failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => *status,
            _ => None,
        }
    }
}

fn join_toolsets(toolsets: &[Toolset]) -> String {
    toolsets
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_carries_fixed_prefix() {
        let err = Error::api(Some(404), "Not found");
        assert_eq!(err.to_string(), "Directus API error: Not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn validation_error_joins_every_violation() {
        let err = Error::Validation(vec![
            "collection: required".to_string(),
            "limit: must be >= 0".to_string(),
        ]);
        assert_eq!(err.to_string(), "collection: required; limit: must be >= 0");
    }

    #[test]
    fn not_enabled_error_names_required_and_active_toolsets() {
        let err = Error::ToolNotEnabled {
            tool: "create_field".to_string(),
            required: vec![Toolset::Schema],
            active: vec![Toolset::Default, Toolset::Content],
        };
        let text = err.to_string();
        assert!(text.contains("create_field"));
        assert!(text.contains("[schema]"));
        assert!(text.contains("[default, content]"));
    }
}
