mod cli;
mod repl;
mod terminal;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, warn};

use descontos_core::Config;
use descontos_llm::create_provider;
use descontos_mcp::McpClient;
use descontos_tool_runtime::{AgenticLoop, Conversation, ToolAwareLlmProvider, ToolRegistry};

use crate::cli::{CliArgs, DEFAULT_SYSTEM_PROMPT};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    descontos_core::config::load_dotenv();

    // Logs stay at warn so they do not interleave with the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env();
    if let Some(url) = args.mcp_url {
        config.mcp.url = url;
    }
    if let Some(model) = args.model {
        config.llm.openai_model = model;
    }
    let system_prompt = args
        .system_prompt
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    let provider = create_provider(&config.llm).context("failed to create LLM provider")?;

    let client = McpClient::connect(&config.mcp.url)
        .await
        .with_context(|| format!("failed to connect to MCP server at {}", config.mcp.url))?;

    let result = chat(&client, provider, &config, system_prompt).await;

    if let Err(e) = client.shutdown().await {
        warn!(error = %e, "Failed to close MCP session");
    }
    if let Err(e) = &result {
        error!(error = %format!("{:#}", e), "Chat session failed");
    }
    result
}

/// Connect the MCP tools to the model and run the REPL.
async fn chat(
    client: &McpClient,
    provider: Arc<dyn ToolAwareLlmProvider>,
    config: &Config,
    system_prompt: String,
) -> Result<()> {
    let mut terminal = Terminal::new(provider.model());
    terminal.print_connected(&client.tool_definitions())?;

    let mut registry = ToolRegistry::new();
    for adapter in client.create_tool_adapters() {
        registry
            .register(adapter)
            .context("MCP server listed a tool twice")?;
    }

    let agentic_loop = AgenticLoop::new(provider, Arc::new(registry))
        .with_temperature(config.llm.temperature)
        .with_max_tokens(config.llm.max_tokens);

    let mut conversation = Conversation::new(system_prompt);
    terminal.print_banner()?;

    let mut lines = crate::terminal::spawn_stdin_reader();
    repl::run(
        &agentic_loop,
        &mut conversation,
        &mut terminal,
        &mut lines,
        repl::ctrl_c,
    )
    .await
}
