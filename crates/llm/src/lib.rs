pub mod providers;

pub use providers::create_provider;
pub use providers::openai_tool_provider::OpenAiToolProvider;
