//! Translation between provider-agnostic conversation types and the OpenAI API format.

use serde_json::{json, Value};

use descontos_tool_runtime::conversation::{AssistantContent, ConversationMessage};
use descontos_tool_runtime::provider::LlmError;
use descontos_tool_runtime::tool::{ToolCall, ToolDefinition};

/// Translate a [`ToolDefinition`] into an OpenAI `function` tool.
pub(super) fn tool_definition_to_openai(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.input_schema,
        }
    })
}

/// Translate a [`ConversationMessage`] into an OpenAI chat message.
pub(super) fn message_to_openai(msg: &ConversationMessage) -> Value {
    match msg {
        ConversationMessage::System(text) => json!({
            "role": "system",
            "content": text,
        }),
        ConversationMessage::User(text) => json!({
            "role": "user",
            "content": text,
        }),
        ConversationMessage::Assistant(content) => {
            let mut message = json!({
                "role": "assistant",
                "content": content.text,
            });
            if !content.tool_calls.is_empty() {
                message["tool_calls"] = content
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        json!({
                            "id": tc.id,
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                // OpenAI expects the arguments as a JSON-encoded string.
                                "arguments": tc.input.to_string(),
                            }
                        })
                    })
                    .collect();
            }
            message
        }
        ConversationMessage::ToolResult(result) => json!({
            "role": "tool",
            "tool_call_id": result.tool_call_id,
            "content": result.content,
        }),
    }
}

/// Read `choices[0].message` of a chat-completions response.
pub(super) fn parse_completion(resp: &Value) -> Result<AssistantContent, LlmError> {
    let message = resp
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message".into()))?;

    let text = message
        .get("content")
        .and_then(|c| c.as_str())
        .map(str::to_string);

    let tool_calls = match message.get("tool_calls").and_then(|t| t.as_array()) {
        Some(calls) => calls.iter().map(parse_tool_call).collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(AssistantContent { text, tool_calls })
}

fn parse_tool_call(call: &Value) -> Result<ToolCall, LlmError> {
    let id = call
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| LlmError::InvalidResponse("tool call without id".into()))?;
    let function = call
        .get("function")
        .ok_or_else(|| LlmError::InvalidResponse(format!("tool call {id} without function")))?;
    let name = function
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| LlmError::InvalidResponse(format!("tool call {id} without name")))?;

    let raw_arguments = function
        .get("arguments")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let input = if raw_arguments.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(raw_arguments).map_err(|e| {
            LlmError::InvalidResponse(format!("arguments of {name} are not valid JSON: {e}"))
        })?
    };

    Ok(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        input,
    })
}
