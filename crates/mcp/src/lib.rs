//! MCP (Model Context Protocol) adapter for the descontos tools.
//!
//! Implements MCP over JSON-RPC 2.0 on the streamable HTTP transport, so
//! the chat client can discover and call the discount tools remotely.
//!
//! # Architecture
//!
//! - **types**: JSON-RPC 2.0 and MCP-specific protocol types
//! - **transport**: HTTP client transport and in-memory channels
//! - **server**: MCP server wrapping a `ToolRegistry`
//! - **http**: axum router exposing the server on `/mcp`
//! - **client**: MCP client with `Tool` adapters for remote tools
//! - **error**: Unified error types
//!
//! # Usage
//!
//! ## Server
//! ```no_run
//! use descontos_mcp::{http, McpServer};
//! use descontos_tool_runtime::tools::desconto_registry;
//! use descontos_tool_runtime::BackingApi;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let registry = desconto_registry(BackingApi::new("http://localhost:8000")?)?;
//! http::serve(McpServer::new(registry), "0.0.0.0:8080").await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Client
//! ```no_run
//! use descontos_mcp::McpClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = McpClient::connect("http://localhost:8080/mcp").await?;
//! let tools = client.tool_definitions();
//! # Ok(())
//! # }
//! ```

pub mod types;
pub mod transport;
pub mod server;
pub mod http;
pub mod client;
pub mod error;

pub use types::*;
pub use transport::{ChannelTransport, HttpClientTransport, McpTransport};
pub use server::McpServer;
pub use client::{McpClient, McpTool};
pub use error::McpError;
