//! MCP client implementation.
//!
//! Connects to an MCP server over any `McpTransport`, discovers its tools,
//! and provides an adapter implementing the `Tool` trait for each remote
//! tool so they can sit in a local `ToolRegistry`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use descontos_tool_runtime::tool::{Tool, ToolDefinition, ToolError, ToolResult};

use crate::error::McpError;
use crate::transport::{HttpClientTransport, McpTransport};
use crate::types::*;

/// Shared request/response channel to one server.
struct Connection {
    transport: Mutex<Box<dyn McpTransport>>,
    next_id: AtomicI64,
}

impl Connection {
    /// Send a request and wait for the response carrying the same id.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, McpError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(RpcId::Number(id), method, params);
        let json = serde_json::to_string(&request)?;

        tracing::debug!(method = %method, id = %id, "Sending request");

        let mut transport = self.transport.lock().await;
        transport.send(&json).await?;

        loop {
            let line = transport.receive().await?.ok_or_else(|| {
                McpError::ServerUnavailable(format!("no response to '{}'", method))
            })?;
            let raw: Value = serde_json::from_str(&line)?;

            // Server-initiated notifications can precede the response.
            if raw.get("id").is_none() {
                tracing::debug!(message = %line, "Skipping server notification");
                continue;
            }

            let response: JsonRpcResponse = serde_json::from_value(raw)?;
            if response.id != RpcId::Number(id) {
                tracing::debug!(id = ?response.id, "Skipping response for another request");
                continue;
            }
            if let Some(err) = response.error {
                return Err(McpError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            return response
                .result
                .ok_or_else(|| McpError::InvalidResponse(format!("'{}' returned no result", method)));
        }
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> Result<(), McpError> {
        let json = serde_json::to_string(&JsonRpcNotification::new(method, params))?;
        self.transport.lock().await.send(&json).await
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        let params = serde_json::to_value(CallToolParams {
            name: name.to_string(),
            arguments,
        })?;
        let result = self.request("tools/call", Some(params)).await?;
        Ok(serde_json::from_value(result)?)
    }
}

/// An MCP client session with discovered tools.
pub struct McpClient {
    connection: Arc<Connection>,
    server_info: ServerInfo,
    tools: Vec<ToolInfo>,
}

impl McpClient {
    /// Connect to a streamable HTTP MCP endpoint, e.g. `http://localhost:8080/mcp`.
    pub async fn connect(url: &str) -> Result<Self, McpError> {
        tracing::info!(url = %url, "Connecting to MCP server");
        Self::with_transport(HttpClientTransport::new(url)).await
    }

    /// Run the initialize handshake and tool discovery over `transport`.
    pub async fn with_transport(transport: impl McpTransport + 'static) -> Result<Self, McpError> {
        let connection = Arc::new(Connection {
            transport: Mutex::new(Box::new(transport)),
            next_id: AtomicI64::new(1),
        });

        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "descontos-chat",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        let init: InitializeResult =
            serde_json::from_value(connection.request("initialize", Some(params)).await?)?;
        connection.notify("notifications/initialized", None).await?;

        tracing::info!(
            server = %init.server_info.name,
            protocol = %init.protocol_version,
            "MCP client initialized"
        );

        let listed: ListToolsResult =
            serde_json::from_value(connection.request("tools/list", None).await?)?;
        for tool in &listed.tools {
            tracing::debug!(name = %tool.name, "Discovered tool");
        }
        tracing::info!(count = listed.tools.len(), "Tool discovery complete");

        Ok(Self {
            connection,
            server_info: init.server_info,
            tools: listed.tools,
        })
    }

    /// Call a tool on the remote MCP server.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        self.connection.call_tool(name, arguments).await
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Discovered tools in the order the server listed them.
    pub fn tool_infos(&self) -> &[ToolInfo] {
        &self.tools
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().cloned().map(ToolDefinition::from).collect()
    }

    /// Create `McpTool` adapters for all discovered tools.
    pub fn create_tool_adapters(&self) -> Vec<McpTool> {
        self.tools
            .iter()
            .map(|info| McpTool {
                info: info.clone(),
                connection: Arc::clone(&self.connection),
            })
            .collect()
    }

    /// End the session.
    pub async fn shutdown(self) -> Result<(), McpError> {
        tracing::info!("Closing MCP session");
        self.connection.transport.lock().await.close().await
    }
}

/// A remote tool adapter that implements the `Tool` trait.
pub struct McpTool {
    info: ToolInfo,
    connection: Arc<Connection>,
}

#[async_trait]
impl Tool for McpTool {
    fn definition(&self) -> ToolDefinition {
        self.info.clone().into()
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .connection
            .call_tool(&self.info.name, input)
            .await
            .map_err(|e| ToolError::ExecutionFailed(e.to_string()))?;

        let mut text = result.joined_text();
        if text.is_empty() {
            text = "Sem resultado".to_string();
        }

        Ok(if result.is_error {
            ToolResult::error(text)
        } else {
            ToolResult::text(text)
        })
    }
}
