//! EDP Assistant - a tool-calling research assistant for the EDP/SolveBio
//! platform
//!
//! Routes a user message through a Bedrock-hosted chat model, lets the model
//! invoke tools (SolveBio expression generation, a calculator, web search),
//! feeds tool results back, and stops when the model stops asking.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Chat model abstraction with the Bedrock runtime implementation
//! - **Tools**: The closed capability set and its dispatch
//! - **Agent**: The loop driver, conversation state, and flow state machine
//! - **Checkpoint**: Per-thread conversation persistence
//! - **CLI**: Command-line interface and REPL
//!
//! # Usage
//!
//! ```rust,no_run
//! use edp_assistant::{Assistant, Config};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let assistant = Assistant::new(Config::load()).unwrap();
//!
//!     let answer = assistant
//!         .run(Uuid::new_v4(), "what is 2+2")
//!         .await
//!         .unwrap();
//!     println!("{}", answer);
//! }
//! ```

pub mod agent;
pub mod checkpoint;
pub mod cli;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::Assistant;
pub use checkpoint::{Checkpointer, MemorySaver};
pub use cli::Repl;
pub use core::{AssistantError, Config, Result};
