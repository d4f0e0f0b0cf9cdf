use crate::conversation::{AssistantContent, ConversationMessage};
use crate::tool::ToolDefinition;
use async_trait::async_trait;

/// Sampling options for a single completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    /// `None` leaves the limit to the provider.
    pub max_tokens: Option<u32>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: Some(2000),
        }
    }
}

/// Trait for LLM providers that support tool use.
///
/// This trait lives in tool-runtime (not in crates/llm) because it's
/// defined by the consumer (the agentic loop), not the provider.
/// Implementations live in crates/llm.
#[async_trait]
pub trait ToolAwareLlmProvider: Send + Sync {
    /// Request one assistant message. When `tools` is empty the request is
    /// sent without any tool catalogue.
    async fn complete_with_tools(
        &self,
        messages: Vec<ConversationMessage>,
        tools: Vec<ToolDefinition>,
        options: &CompletionOptions,
    ) -> Result<AssistantContent, LlmError>;

    /// Provider name for logging/debugging (e.g., "openai")
    fn provider_name(&self) -> &str;

    /// Model identifier sent with each request.
    fn model(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Mock LLM provider for testing the agentic loop without real API calls.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use crate::tool::ToolCall;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// What the loop sent on one call.
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub messages: Vec<ConversationMessage>,
        pub tools: Vec<ToolDefinition>,
        pub options: CompletionOptions,
    }

    /// A mock provider that returns pre-configured responses in FIFO order.
    pub struct MockLlmProvider {
        responses: Mutex<VecDeque<Result<AssistantContent, LlmError>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockLlmProvider {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue a response that will be returned after the ones already queued.
        pub fn queue_response(&self, content: AssistantContent) {
            self.responses.lock().unwrap().push_back(Ok(content));
        }

        /// Queue a simple text response.
        pub fn queue_text(&self, text: &str) {
            self.queue_response(AssistantContent::from_text(text));
        }

        /// Queue a response made only of tool calls `(id, name, input)`.
        pub fn queue_tool_calls(&self, calls: &[(&str, &str, serde_json::Value)]) {
            self.queue_response(AssistantContent {
                text: None,
                tool_calls: calls
                    .iter()
                    .map(|(id, name, input)| ToolCall {
                        id: id.to_string(),
                        name: name.to_string(),
                        input: input.clone(),
                    })
                    .collect(),
            });
        }

        /// Queue a failure.
        pub fn queue_error(&self, error: LlmError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        /// Every request received so far.
        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Default for MockLlmProvider {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ToolAwareLlmProvider for MockLlmProvider {
        async fn complete_with_tools(
            &self,
            messages: Vec<ConversationMessage>,
            tools: Vec<ToolDefinition>,
            options: &CompletionOptions,
        ) -> Result<AssistantContent, LlmError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                messages,
                tools,
                options: options.clone(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(AssistantContent::default()))
        }

        fn provider_name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }
    }
}
