//! The chat loop, independent of where lines and interrupts come from.

use std::future::Future;
use std::io;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use descontos_tool_runtime::{AgenticLoop, Conversation};

use crate::cli::Input;
use crate::terminal::Terminal;

pub type Lines = mpsc::Receiver<io::Result<String>>;

/// Wait for the next line or an interrupt, whichever comes first.
pub async fn next_input(lines: &mut Lines, interrupt: impl Future<Output = ()>) -> io::Result<Input> {
    tokio::select! {
        line = lines.recv() => Ok(Input::parse(line.transpose()?.as_deref())),
        () = interrupt => Ok(Input::Interrupted),
    }
}

/// One `AgenticLoop` turn per line until an exit keyword, end-of-input or
/// an interrupt. An interrupt also abandons a turn in flight.
pub async fn run<F, Fut>(
    agentic_loop: &AgenticLoop,
    conversation: &mut Conversation,
    terminal: &mut Terminal,
    lines: &mut Lines,
    interrupt: F,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        terminal.print_prompt()?;
        let message = match next_input(lines, interrupt())
            .await
            .context("failed to read input")?
        {
            Input::Message(text) => text,
            Input::Skip => continue,
            Input::Exit => break,
            Input::Interrupted => {
                terminal.print_info("")?;
                break;
            }
        };

        let outcome = tokio::select! {
            outcome = agentic_loop.run(conversation, message, &mut *terminal) => Some(outcome),
            () = interrupt() => None,
        };
        let Some(outcome) = outcome else {
            terminal.print_info("")?;
            break;
        };

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                terminal.print_error(&e.to_string())?;
                return Err(anyhow::Error::new(e).context("chat turn failed"));
            }
        };
        info!(
            tools = outcome.tool_results.len(),
            messages = conversation.len(),
            "Turn complete"
        );
        terminal.print_reply(&outcome.reply)?;
    }

    terminal.print_info("👋 Chat encerrado!")?;
    Ok(())
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
}
