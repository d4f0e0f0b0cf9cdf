use crate::conversation::{AssistantContent, Conversation};
use crate::provider::{CompletionOptions, LlmError, ToolAwareLlmProvider};
use crate::registry::ToolRegistry;
use crate::tool::{ToolCall, ToolResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives progress while a turn is being resolved, so a front end can
/// print it as it happens.
pub trait TurnObserver {
    /// The model asked for one or more tools.
    fn tools_requested(&mut self, _calls: &[ToolCall]) {}

    /// A tool is about to run.
    fn tool_started(&mut self, _call: &ToolCall) {}

    /// A tool finished; its text is already in the conversation.
    fn tool_finished(&mut self, _call: &ToolCall, _result: &ToolResult) {}
}

/// Observer that ignores everything.
impl TurnObserver for () {}

/// What one user turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Final assistant text shown to the user.
    pub reply: String,
    /// Tool results in call order (empty when the model answered directly).
    pub tool_results: Vec<ToolResult>,
}

impl TurnOutcome {
    pub fn used_tools(&self) -> bool {
        !self.tool_results.is_empty()
    }
}

/// Resolves a user turn in at most two model calls.
///
/// Flow: User → LLM (with tools) → [ToolCalls → Execute one by one → LLM (no tools)] → Final Text
pub struct AgenticLoop {
    provider: Arc<dyn ToolAwareLlmProvider>,
    registry: Arc<ToolRegistry>,
    temperature: f32,
    max_tokens: u32,
}

impl AgenticLoop {
    pub fn new(provider: Arc<dyn ToolAwareLlmProvider>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            registry,
            temperature: 0.1,
            max_tokens: 2000,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run a single user turn. The conversation receives the user turn, the
    /// assistant reply, any tool results, and the final answer, in that order.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        user_message: String,
        observer: &mut dyn TurnObserver,
    ) -> Result<TurnOutcome, AgenticLoopError> {
        conversation.add_user_message(user_message);

        let first_options = CompletionOptions {
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        };
        let response = self
            .provider
            .complete_with_tools(
                conversation.messages().to_vec(),
                self.registry.list(),
                &first_options,
            )
            .await?;
        conversation.add_assistant_response(response.clone());

        if !response.has_tool_calls() {
            debug!("Model answered without tools");
            return Ok(TurnOutcome {
                reply: response.text.unwrap_or_default(),
                tool_results: Vec::new(),
            });
        }

        info!(count = response.tool_calls.len(), "Executing tool calls");
        observer.tools_requested(&response.tool_calls);

        let mut tool_results = Vec::with_capacity(response.tool_calls.len());
        for call in &response.tool_calls {
            observer.tool_started(call);
            let result = self.execute_tool_call(call).await;
            conversation.add_tool_result(result.clone());
            observer.tool_finished(call, &result);
            tool_results.push(result);
        }

        // Second round: no tools attached, so the model must answer in text.
        let final_options = CompletionOptions {
            temperature: self.temperature,
            max_tokens: None,
        };
        let final_response = self
            .provider
            .complete_with_tools(conversation.messages().to_vec(), Vec::new(), &final_options)
            .await?;
        if final_response.has_tool_calls() {
            warn!("Final response requested tools; ignoring them");
        }

        let reply = final_response.text.unwrap_or_default();
        conversation.add_assistant_response(AssistantContent::from_text(reply.clone()));

        Ok(TurnOutcome { reply, tool_results })
    }

    async fn execute_tool_call(&self, call: &ToolCall) -> ToolResult {
        let mut result = match self.registry.get(&call.name) {
            Some(tool) => match tool.execute(call.input.clone()).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Tool failed");
                    ToolResult::error(format!("Erro ao executar {}: {}", call.name, e))
                }
            },
            None => {
                warn!(tool = %call.name, "Model requested an unknown tool");
                ToolResult::error(format!("Ferramenta '{}' não encontrada.", call.name))
            }
        };
        result.tool_call_id = call.id.clone();
        result
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgenticLoopError {
    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),
}
