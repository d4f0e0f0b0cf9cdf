use clap::Parser;

/// Interactive chat about supplier/retailer discounts.
///
/// Sends each message to an OpenAI-compatible model together with the
/// tools discovered on the MCP server, and prints the final answer.
#[derive(Parser, Debug)]
#[command(name = "descontos-chat", about = "Chat REPL backed by the descontos MCP tools")]
pub struct CliArgs {
    /// MCP endpoint (overrides MCP_URL)
    #[arg(long)]
    pub mcp_url: Option<String>,

    /// Model name (overrides OPENAI_MODEL)
    #[arg(long)]
    pub model: Option<String>,

    /// System prompt override
    #[arg(long)]
    pub system_prompt: Option<String>,
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Você é um assistente especializado em análise de descontos entre fornecedores e varejistas.

Ferramentas disponíveis:
- desconto_realizado: Busca descontos já realizados
- desconto_calculado: Calcula descontos potenciais
- tabela_variaveis: Lista todas as variáveis/mapeamentos

Sempre pergunte fornecedor e varejista quando necessário. \
Use as ferramentas MCP automaticamente para obter dados reais da API.";

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Message(String),
    Skip,
    Exit,
    /// Ctrl+C; ends the session like `Exit`.
    Interrupted,
}

impl Input {
    /// Classify one line of input; `None` is end-of-input.
    pub fn parse(line: Option<&str>) -> Self {
        let Some(line) = line else {
            return Input::Exit;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Input::Skip;
        }
        match trimmed.to_lowercase().as_str() {
            "sair" | "exit" | "quit" => Input::Exit,
            _ => Input::Message(trimmed.to_string()),
        }
    }
}
