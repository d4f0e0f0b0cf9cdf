use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Describes a tool's interface for LLM consumption.
/// Maps to the OpenAI function format and the MCP `tools/list` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique tool name (e.g., "desconto_realizado")
    pub name: String,
    /// Human-readable description for the LLM
    pub description: String,
    /// JSON Schema describing the expected input
    pub input_schema: Value,
}

/// Represents an LLM requesting execution of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this invocation (used to match results)
    pub id: String,
    /// Tool name to execute
    pub name: String,
    /// JSON input arguments
    pub input: Value,
}

/// Result of executing a tool, sent back to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Must match the ToolCall id
    pub tool_call_id: String,
    /// Result content, always plain text
    pub content: String,
    /// Whether this result represents an error
    pub is_error: bool,
}

impl ToolResult {
    /// Successful text result. The call id is filled in by the caller.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tool_call_id: String::new(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Error rendered as text so the model can read it.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            tool_call_id: String::new(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// The primary extension point: all tools implement this trait.
///
/// Tools are object-safe, Send + Sync, and async. Local HTTP-backed tools
/// and remote MCP tool adapters both implement it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool's definition (name, description, JSON Schema).
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl fmt::Display for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// Read a required string argument from a tool's JSON input.
pub fn required_str<'a>(input: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    input
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidInput(format!("missing '{}' field", field)))
}

/// Simple echo tool for testing purposes.
#[cfg(any(test, feature = "test-utils"))]
pub struct EchoTool;

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Tool for EchoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "echo".to_string(),
            description: "Echoes back the input message. For testing.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "The message to echo back"
                    }
                },
                "required": ["message"]
            }),
        }
    }

    async fn execute(&self, input: Value) -> Result<ToolResult, ToolError> {
        let message = required_str(&input, "message")?;
        Ok(ToolResult::text(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_display() {
        let def = ToolDefinition {
            name: "tabela_variaveis".to_string(),
            description: "Retorna a tabela".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
        };
        assert_eq!(def.to_string(), "tabela_variaveis: Retorna a tabela");
    }

    #[test]
    fn test_result_constructors() {
        let ok = ToolResult::text("fine");
        assert!(!ok.is_error);
        assert!(ok.tool_call_id.is_empty());

        let err = ToolResult::error("broken");
        assert!(err.is_error);
        assert_eq!(err.content, "broken");
    }

    #[test]
    fn test_required_str() {
        let input = serde_json::json!({"fornecedor": "ACME", "varejista": 42});
        assert_eq!(required_str(&input, "fornecedor").unwrap(), "ACME");
        assert!(matches!(
            required_str(&input, "varejista"),
            Err(ToolError::InvalidInput(_))
        ));
        assert!(required_str(&input, "missing").is_err());
    }

    #[tokio::test]
    async fn test_echo_tool() {
        let tool = EchoTool;
        assert_eq!(tool.definition().name, "echo");

        let result = tool
            .execute(serde_json::json!({"message": "hello world"}))
            .await
            .unwrap();
        assert_eq!(result.content, "hello world");
        assert!(!result.is_error);
    }
}
