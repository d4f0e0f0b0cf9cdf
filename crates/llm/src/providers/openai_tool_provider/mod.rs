//! OpenAI chat-completions implementation of [`ToolAwareLlmProvider`].
//!
//! Sends the conversation and tool catalogue as `messages` / `tools`
//! (function calling) and turns `choices[0].message` back into
//! [`AssistantContent`].

mod translate;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use descontos_tool_runtime::conversation::{AssistantContent, ConversationMessage};
use descontos_tool_runtime::provider::{CompletionOptions, LlmError, ToolAwareLlmProvider};
use descontos_tool_runtime::tool::ToolDefinition;

use self::translate::{message_to_openai, parse_completion, tool_definition_to_openai};

/// Base URL without trailing slashes or `/v1`, so both
/// `https://api.openai.com` and `https://api.openai.com/v1/` work.
fn api_root(base_url: &str) -> &str {
    let trimmed = base_url.trim_end_matches('/');
    trimmed
        .strip_suffix("/v1")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
}

pub struct OpenAiToolProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiToolProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: api_root(&base_url).to_string(),
        }
    }

    /// Full chat-completions endpoint.
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Build the JSON request body for one completion.
    pub(crate) fn request_body(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
        options: &CompletionOptions,
    ) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(message_to_openai).collect::<Vec<_>>(),
            "temperature": options.temperature,
        });
        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.iter().map(tool_definition_to_openai).collect());
            body["tool_choice"] = json!("auto");
        }
        body
    }
}

#[async_trait]
impl ToolAwareLlmProvider for OpenAiToolProvider {
    async fn complete_with_tools(
        &self,
        messages: Vec<ConversationMessage>,
        tools: Vec<ToolDefinition>,
        options: &CompletionOptions,
    ) -> Result<AssistantContent, LlmError> {
        let url = self.completions_url();
        let body = self.request_body(&messages, &tools, options);

        debug!(
            url = %url,
            messages = messages.len(),
            tools = tools.len(),
            "OpenAI request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message });
        }

        let resp: Value = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        parse_completion(&resp)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests;
