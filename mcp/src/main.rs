use clap::Parser;

use directus_mcp_runtime::observability::init_tracing;
use directus_mcp_runtime::{DirectusArgs, McpCommands, run};

#[derive(Parser)]
#[command(
    name = "directus-mcp",
    version,
    about = "Directus MCP server: exposes a Directus instance as MCP tools over stdio"
)]
struct Cli {
    #[command(flatten)]
    directus: DirectusArgs,

    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<McpCommands>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    let code = run(cli.directus, cli.command.unwrap_or(McpCommands::Serve)).await;
    std::process::exit(code);
}
