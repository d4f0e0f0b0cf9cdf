//! MCP server implementation.
//!
//! Wraps a `ToolRegistry` and exposes its tools over the MCP protocol.
//! Message handling takes `&self`, so one server can be shared between
//! HTTP sessions; `run` drives it over any `McpTransport`.

use serde_json::Value;

use descontos_tool_runtime::ToolRegistry;

use crate::error::McpError;
use crate::transport::McpTransport;
use crate::types::*;

/// MCP server that bridges a `ToolRegistry` to MCP clients.
pub struct McpServer {
    registry: ToolRegistry,
    server_name: String,
    server_version: String,
}

impl McpServer {
    /// Create a new MCP server wrapping the given tool registry.
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            server_name: "descontos-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set the server name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.server_name
    }

    pub fn version(&self) -> &str {
        &self.server_version
    }

    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// Run the server loop, reading from and writing to the transport.
    ///
    /// Processes JSON-RPC messages until the transport is closed.
    pub async fn run<T: McpTransport>(&self, transport: &mut T) -> Result<(), McpError> {
        tracing::info!(server = %self.server_name, "MCP server starting");

        while let Some(line) = transport.receive().await? {
            tracing::debug!(message = %line, "Received message");
            if let Some(response) = self.handle_message(&line).await {
                let json = serde_json::to_string(&response)?;
                tracing::debug!(response = %json, "Sending response");
                transport.send(&json).await?;
            }
        }

        tracing::info!("Transport closed, shutting down");
        Ok(())
    }

    /// Handle one raw JSON-RPC message. Notifications produce no response.
    pub async fn handle_message(&self, line: &str) -> Option<JsonRpcResponse> {
        match serde_json::from_str::<Value>(line) {
            Ok(raw) => self.handle_value(raw).await,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON");
                let err = McpError::JsonParse(e).to_rpc_error();
                Some(JsonRpcResponse::error(RpcId::Null, err.code, err.message))
            }
        }
    }

    /// Handle an already parsed JSON-RPC message.
    pub async fn handle_value(&self, raw: Value) -> Option<JsonRpcResponse> {
        // Requests carry an "id"; notifications do not.
        if raw.get("id").is_none() {
            match serde_json::from_value::<JsonRpcNotification>(raw) {
                Ok(notif) => self.handle_notification(&notif),
                Err(e) => tracing::debug!(error = %e, "Ignoring malformed notification"),
            }
            return None;
        }

        match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) => Some(self.handle_request(&request).await),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON-RPC request");
                Some(JsonRpcResponse::error(
                    RpcId::Null,
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ))
            }
        }
    }

    /// Handle a single JSON-RPC request and produce a response.
    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        let outcome = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request.params),
            "ping" => Ok(Value::Object(Default::default())),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(&request.params).await,
            method => {
                tracing::warn!(method = %method, "Unknown method");
                Err(McpError::MethodNotFound(method.to_string()))
            }
        };

        match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                let err = e.to_rpc_error();
                JsonRpcResponse::error(id, err.code, err.message)
            }
        }
    }

    fn handle_notification(&self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" => {
                tracing::info!("Client confirmed initialization");
            }
            "notifications/cancelled" => {
                tracing::debug!("Client cancelled a request");
            }
            method => {
                tracing::debug!(method = %method, "Unknown notification, ignoring");
            }
        }
    }

    fn handle_initialize(&self, params: &Option<Value>) -> Result<Value, McpError> {
        match params
            .clone()
            .map(serde_json::from_value::<InitializeParams>)
        {
            Some(Ok(p)) => tracing::info!(
                client = %p.client_info.name,
                client_version = p.client_info.version.as_deref().unwrap_or("?"),
                requested_version = %p.protocol_version,
                "Handling initialize"
            ),
            _ => tracing::info!("Handling initialize (no client info)"),
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: Some(self.server_version.clone()),
            },
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_list_tools(&self) -> Result<Value, McpError> {
        tracing::debug!("Handling tools/list");
        let tools: Vec<ToolInfo> = self.registry.list().into_iter().map(ToolInfo::from).collect();
        Ok(serde_json::to_value(ListToolsResult { tools })?)
    }

    async fn handle_call_tool(&self, params: &Option<Value>) -> Result<Value, McpError> {
        let params = params
            .clone()
            .ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let call_params: CallToolParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        tracing::debug!(tool = %call_params.name, "Handling tools/call");

        let result = match self.registry.get(&call_params.name) {
            Some(tool) => match tool.execute(call_params.arguments).await {
                Ok(tool_result) => CallToolResult::text(tool_result.content, tool_result.is_error),
                Err(e) => {
                    tracing::warn!(tool = %call_params.name, error = %e, "Tool execution failed");
                    CallToolResult::text(e.to_string(), true)
                }
            },
            None => {
                tracing::warn!(tool = %call_params.name, "Unknown tool requested");
                CallToolResult::text(
                    format!("Ferramenta '{}' não encontrada.", call_params.name),
                    true,
                )
            }
        };

        Ok(serde_json::to_value(result)?)
    }
}
