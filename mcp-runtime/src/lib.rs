//! Model Context Protocol runtime exposing a Directus instance as tools.
//!
//! The layers, bottom-up: [`query`] encodes read parameters, [`client`]
//! talks to the REST API, [`resource`] and [`endpoints`] give each resource
//! kind its CRUD surface, [`tool`] and [`tools`] wrap those into MCP tools,
//! [`toolset`] decides which tools are exposed, and [`server`] speaks
//! JSON-RPC over stdio.

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod observability;
pub mod query;
pub mod resource;
pub mod schema;
pub mod server;
pub mod tool;
pub mod tools;
pub mod toolset;

pub use client::DirectusClient;
pub use config::DirectusConfig;
pub use error::{Error, Result};

use clap::{Args, Subcommand};
use serde_json::{Value, json};

use crate::server::McpServer;
use crate::toolset::ActiveToolsets;

/// Connection and toolset settings shared by every subcommand.
#[derive(Args, Clone)]
pub struct DirectusArgs {
    /// Base URL of the Directus instance
    #[arg(long, env = "DIRECTUS_URL")]
    pub url: Option<String>,
    /// Static access token (takes precedence over email/password)
    #[arg(long, env = "DIRECTUS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// Login email for session authentication
    #[arg(long, env = "DIRECTUS_EMAIL")]
    pub email: Option<String>,
    /// Login password for session authentication
    #[arg(long, env = "DIRECTUS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Comma-separated toolsets to expose (default, schema, content, flow, dashboard, all)
    #[arg(long, env = "DIRECTUS_TOOLSETS")]
    pub toolsets: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum McpCommands {
    /// Run the MCP server over stdio
    Serve,
    /// Print the tools exposed by the current toolset selection
    Tools(ToolsArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ToolsArgs {
    /// Include tools hidden by the toolset selection, with their toolsets
    #[arg(long)]
    pub all: bool,
}

/// Execute `command` and return the process exit code.
pub async fn run(args: DirectusArgs, command: McpCommands) -> i32 {
    let result = match command {
        McpCommands::Serve => serve(args).await,
        McpCommands::Tools(tools_args) => {
            tools_listing(args.toolsets.as_deref(), tools_args.all)
                .map(|listing| println!("{}", to_pretty_json(&listing)))
        }
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("{err}");
            let payload = json!({
                "error": error_code(&err),
                "message": err.to_string(),
            });
            eprintln!("{}", to_pretty_json(&payload));
            1
        }
    }
}

async fn serve(args: DirectusArgs) -> Result<()> {
    let config = DirectusConfig::new(
        args.url.as_deref().unwrap_or_default(),
        args.token,
        args.email,
        args.password,
    )?;
    let registry = tools::registry(ActiveToolsets::parse(args.toolsets.as_deref()))?;
    let client = DirectusClient::connect(&config).await?;

    McpServer::new(client, registry).serve_stdio().await
}

fn tools_listing(toolsets: Option<&str>, include_hidden: bool) -> Result<Value> {
    let registry = tools::registry(ActiveToolsets::parse(toolsets))?;
    let tools: Vec<Value> = if include_hidden {
        registry
            .all()
            .iter()
            .map(|tool| {
                let mut descriptor = tool.descriptor();
                descriptor["toolsets"] = json!(tool.toolsets());
                descriptor["exposed"] = json!(registry.active().exposes(tool.toolsets()));
                descriptor
            })
            .collect()
    } else {
        registry.exposed().map(|tool| tool.descriptor()).collect()
    };
    Ok(json!({
        "active_toolsets": registry.active().to_vec(),
        "tools": tools,
    }))
}

fn error_code(err: &Error) -> &'static str {
    match err {
        Error::Config(_) => "config_error",
        Error::Auth(_) => "auth_error",
        Error::Io(_) => "io_error",
        _ => "mcp_server_error",
    }
}

fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
