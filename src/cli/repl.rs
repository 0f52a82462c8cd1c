//! Interactive REPL
//!
//! Provides the main user interaction loop. Each REPL session drives one
//! conversation thread; `clear` rotates to a fresh thread id.

use std::io::{self, BufRead, Write};

use uuid::Uuid;

use crate::agent::Assistant;
use crate::cli::commands::{handle_command, CommandResult};
use crate::core::{Config, Result};

/// Interactive REPL (Read-Eval-Print Loop)
pub struct Repl {
    assistant: Assistant,
    thread_id: Uuid,
}

impl Repl {
    /// Create a REPL with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            assistant: Assistant::new(config)?,
            thread_id: Uuid::new_v4(),
        })
    }

    /// Run the REPL
    pub async fn run(&mut self) -> Result<()> {
        self.print_banner();

        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            print!("You: ");
            stdout.flush()?;

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    // EOF (Ctrl+D)
                    println!("\nGoodbye!");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }

            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input, &mut self.assistant, self.thread_id).await {
                Ok(CommandResult::Exit) => {
                    println!("\nGoodbye!");
                    break;
                }
                Ok(CommandResult::NewThread) => {
                    self.thread_id = Uuid::new_v4();
                    println!("Started a new conversation.\n");
                    continue;
                }
                Ok(CommandResult::Handled(output)) => {
                    println!("{}\n", output);
                    continue;
                }
                Ok(CommandResult::Continue(message)) => {
                    match self.assistant.run(self.thread_id, &message).await {
                        Ok(response) => {
                            println!("\nAssistant:\n{}\n", response);
                        }
                        Err(e) => {
                            eprintln!("\nError: {}\n", e);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Command error: {}\n", e);
                }
            }
        }

        Ok(())
    }

    /// Print the startup banner
    fn print_banner(&self) {
        let config = self.assistant.config();

        println!("EDP Assistant :: SolveBio expressions, calculations, web search");
        println!("Model:  {}", config.models.default);
        println!("Region: {}", config.bedrock.region);
        println!();
        println!("Commands: help, status, clear, debug, exit");
        println!("─────────────────────────────────────────────────────────────");
    }
}
