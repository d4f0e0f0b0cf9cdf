pub mod tool;
pub mod tools;
pub mod registry;
pub mod runtime;
pub mod provider;
pub mod conversation;

pub use tool::{Tool, ToolCall, ToolDefinition, ToolError, ToolResult};
pub use registry::{RegistryError, ToolRegistry};
pub use runtime::{AgenticLoop, AgenticLoopError, TurnObserver, TurnOutcome};
pub use provider::{CompletionOptions, LlmError, ToolAwareLlmProvider};
pub use conversation::{AssistantContent, Conversation, ConversationMessage};
pub use tools::{
    BackingApi, DescontoCalculadoTool, DescontoRealizadoTool, TabelaVariaveisTool,
};
