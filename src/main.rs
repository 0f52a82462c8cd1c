//! EDP Assistant - CLI entry point.

use clap::Parser;
use uuid::Uuid;

use edp_assistant::{Assistant, Config, Repl};

/// EDP/SolveBio expression assistant with web search and calculator
#[derive(Parser, Debug)]
#[command(name = "edpa")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat model alias
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Conversation thread to resume (random if omitted)
    #[arg(long, short = 't')]
    thread: Option<Uuid>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref model) = args.model {
        config.models.default = model.clone();
    }

    if args.debug {
        config.agent.debug = true;
    }

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let assistant = Assistant::new(config)?;
        let thread_id = args.thread.unwrap_or_else(Uuid::new_v4);

        let response = assistant.run(thread_id, &prompt).await?;
        println!("{}", response);
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config)?;
    repl.run().await?;

    Ok(())
}
