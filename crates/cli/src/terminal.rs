use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, BufRead, Write};
use tokio::sync::mpsc;

use descontos_tool_runtime::{ToolCall, ToolDefinition, ToolResult, TurnObserver};

/// Characters of a tool result shown in the progress line.
const PREVIEW_CHARS: usize = 200;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const USER_PROMPT: Color = Color::Green;
    const ASSISTANT_TEXT: Color = Color::Cyan;
    const TOOL_CALL: Color = Color::Yellow;
    const TOOL_RESULT: Color = Color::DarkGreen;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const HEADER: Color = Color::Magenta;
}

/// Manages terminal I/O for the interactive REPL.
pub struct Terminal {
    model: String,
}

impl Terminal {
    pub fn new(model: impl Into<String>) -> Self {
        Self { model: model.into() }
    }

    /// Print the tools discovered on the MCP server.
    pub fn print_connected(&self, tools: &[ToolDefinition]) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::TOOL_RESULT),
            Print(format!("✅ Conectado ao MCP! {} ferramentas carregadas:\n", tools.len())),
            ResetColor,
        )?;
        for tool in tools {
            execute!(stdout, Print(format!("  - {}\n", tool)))?;
        }
        execute!(stdout, Print("\n"))?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the startup banner.
    pub fn print_banner(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("🤖 Chat {} + MCP Descontos API\n", self.model)),
            SetForegroundColor(Colors::DIM),
            Print("Digite 'sair' para sair\n\n"),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the input prompt.
    pub fn print_prompt(&self) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::USER_PROMPT),
            Print("Você: "),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print the final answer of a turn followed by the separator.
    pub fn print_reply(&self, reply: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            Print("\n"),
            SetForegroundColor(Colors::ASSISTANT_TEXT),
            Print(format!("🤖 {}: ", self.model)),
            ResetColor,
            Print(format!("{}\n", reply)),
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", "-".repeat(80))),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an error message.
    pub fn print_error(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::ERROR),
            Print(format!("Erro: {}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Print an info message.
    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn print_progress(&self, color: Color, line: String) {
        let mut stdout = io::stdout();
        // Progress output is best effort; a broken stdout surfaces on the next read.
        execute!(stdout, SetForegroundColor(color), Print(line), ResetColor).ok();
        stdout.flush().ok();
    }
}

impl TurnObserver for Terminal {
    fn tools_requested(&mut self, _calls: &[ToolCall]) {
        self.print_progress(Colors::TOOL_CALL, "\n🛠️  Executando ferramentas...\n".to_string());
    }

    fn tool_started(&mut self, call: &ToolCall) {
        self.print_progress(Colors::TOOL_CALL, format!("🔄 Chamando {}...\n", call.name));
    }

    fn tool_finished(&mut self, call: &ToolCall, result: &ToolResult) {
        let color = if result.is_error { Colors::ERROR } else { Colors::TOOL_RESULT };
        self.print_progress(color, format!("{}\n", result_preview(&call.name, &result.content)));
    }
}

/// Lines from stdin, read on a dedicated thread so the REPL can wait for
/// Ctrl+C at the same time. The channel closes at end-of-input.
pub fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// `✅ {tool}: {first 200 chars}...`
pub fn result_preview(tool_name: &str, content: &str) -> String {
    let head: String = content.chars().take(PREVIEW_CHARS).collect();
    format!("✅ {}: {}...", tool_name, head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_preview_truncates_on_chars() {
        let content = "ç".repeat(300);
        let line = result_preview("desconto_realizado", &content);
        assert_eq!(
            line,
            format!("✅ desconto_realizado: {}...", "ç".repeat(200))
        );
    }

    #[test]
    fn test_result_preview_short_content() {
        assert_eq!(
            result_preview("tabela_variaveis", r#"{"data":[]}"#),
            r#"✅ tabela_variaveis: {"data":[]}..."#
        );
    }
}
