//! MCP server exposing the discount lookup tools over streamable HTTP.

use anyhow::Context;
use clap::Parser;
use tracing::info;

use descontos_core::Config;
use descontos_mcp::{http, McpServer};
use descontos_tool_runtime::tools::desconto_registry;
use descontos_tool_runtime::BackingApi;

#[derive(Parser, Debug)]
#[command(name = "descontos-mcp-server", about = "MCP server for the discount API tools")]
struct Cli {
    /// Base URL of the discount REST API (overrides API_BASE_URL).
    #[arg(long)]
    api_base_url: Option<String>,

    /// Address to listen on (overrides MCP_HOST/MCP_PORT).
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    descontos_core::config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let api_base_url = cli.api_base_url.unwrap_or(config.mcp.api_base_url.clone());
    let bind = cli.bind.unwrap_or_else(|| config.mcp.bind_addr());

    let api = BackingApi::new(&api_base_url)
        .with_context(|| format!("invalid API base URL: {}", api_base_url))?;
    let registry = desconto_registry(api)?;

    let server = McpServer::new(registry).with_name("desconto-api-server");
    info!(api = %api_base_url, "descontos-mcp-server starting");
    http::serve(server, &bind).await?;

    Ok(())
}
