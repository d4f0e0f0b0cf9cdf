pub mod openai_tool_provider;

use std::sync::Arc;

use descontos_core::config::LlmConfig;
use descontos_tool_runtime::{LlmError, ToolAwareLlmProvider};

use self::openai_tool_provider::OpenAiToolProvider;

/// Create the chat-completions provider from config.
pub fn create_provider(llm_config: &LlmConfig) -> Result<Arc<dyn ToolAwareLlmProvider>, LlmError> {
    let api_key = llm_config
        .openai_api_key
        .as_ref()
        .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
    Ok(Arc::new(OpenAiToolProvider::new(
        api_key.clone(),
        llm_config.openai_model.clone(),
        llm_config.openai_base_url.clone(),
    )))
}
