//! CLI commands
//!
//! Special commands that can be executed in the REPL.

use uuid::Uuid;

use crate::agent::Assistant;
use crate::core::Result;

/// Result of parsing a command
pub enum CommandResult {
    /// Continue processing as normal input
    Continue(String),
    /// Command was handled, show output
    Handled(String),
    /// Start a new conversation thread
    NewThread,
    /// Exit the REPL
    Exit,
}

/// Parse and handle special commands
pub async fn handle_command(
    input: &str,
    assistant: &mut Assistant,
    thread_id: Uuid,
) -> Result<CommandResult> {
    let input = input.trim();
    let cmd = input.split_whitespace().next().unwrap_or("").to_lowercase();

    match cmd.as_str() {
        "exit" | "quit" | "q" => Ok(CommandResult::Exit),

        "clear" | "new" => Ok(CommandResult::NewThread),

        "help" | "?" => Ok(CommandResult::Handled(help_text())),

        "status" => {
            let turns = assistant.thread_len(thread_id).await?;
            let config = assistant.config();
            let status = format!(
                "Status:\n\
                 ─────────────────────────────\n\
                 Model:       {}\n\
                 Thread:      {}\n\
                 Turns:       {}\n\
                 Step budget: {}\n\
                 Debug:       {}",
                config.models.default,
                thread_id,
                turns,
                config.agent.max_steps,
                if config.agent.debug { "on" } else { "off" }
            );
            Ok(CommandResult::Handled(status))
        }

        "debug" => {
            let new_state = !assistant.config().agent.debug;
            assistant.config_mut().agent.debug = new_state;
            Ok(CommandResult::Handled(format!(
                "Debug mode: {}",
                if new_state { "ON" } else { "OFF" }
            )))
        }

        _ => {
            if input.starts_with('/') {
                Ok(CommandResult::Handled(format!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    cmd
                )))
            } else {
                Ok(CommandResult::Continue(input.to_string()))
            }
        }
    }
}

fn help_text() -> String {
    "Commands:\n\
     help    Show this help\n\
     status  Show model, thread, and step budget\n\
     clear   Start a new conversation thread\n\
     debug   Toggle debug output\n\
     exit    Quit\n\
     \n\
     Anything else is sent to the assistant."
        .to_string()
}
