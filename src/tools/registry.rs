//! Tool registry - schemas and dispatch
//!
//! The capability set is closed: a tool call parses into a tagged
//! `ToolInvocation` or it doesn't run. Unknown names and malformed arguments
//! become diagnostic result text the model can react to; nothing at this
//! boundary raises past the loop.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::agent::prompts::CODE_GENERATOR_DESCRIPTION;
use crate::core::{Config, Result, ToolCall, ToolDefinition, ToolOutput};
use crate::llm::ChatModel;
use crate::tools::calculator::{self, Calculator};
use crate::tools::codegen::{self, CodeGenerator};
use crate::tools::search::{self, WebSearch};

/// A parsed, argument-checked tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    CodeGenerator { query: String },
    Calculator { expression: String },
    WebSearch { query: String },
}

#[derive(Deserialize)]
struct CodeGeneratorArgs {
    query: String,
}

#[derive(Deserialize)]
struct CalculatorArgs {
    expression: String,
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
}

impl ToolInvocation {
    /// Parse a raw tool call against the closed capability set.
    ///
    /// Errors are diagnostic strings destined for tool-result content.
    pub fn parse(call: &ToolCall) -> std::result::Result<Self, String> {
        match call.name.as_str() {
            codegen::NAME => {
                let args: CodeGeneratorArgs = parse_args(call)?;
                Ok(Self::CodeGenerator { query: args.query })
            }
            calculator::NAME => {
                let args: CalculatorArgs = parse_args(call)?;
                Ok(Self::Calculator {
                    expression: args.expression,
                })
            }
            search::NAME => {
                let args: WebSearchArgs = parse_args(call)?;
                Ok(Self::WebSearch { query: args.query })
            }
            other => Err(format!("Unknown tool: {}", other)),
        }
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(call: &ToolCall) -> std::result::Result<T, String> {
    serde_json::from_value(call.arguments.clone())
        .map_err(|e| format!("Invalid arguments for '{}': {}", call.name, e))
}

/// Registry of the assistant's external capabilities
pub struct ToolRegistry {
    codegen: CodeGenerator,
    calculator: Calculator,
    search: WebSearch,
    timeout: Duration,
}

impl ToolRegistry {
    /// Build the registry with the capability set from configuration
    pub fn from_config(config: &Config, model: Arc<dyn ChatModel>) -> Self {
        Self {
            codegen: CodeGenerator::new(model, config.models.code_generator.clone()),
            calculator: Calculator::new(),
            search: WebSearch::from_config(&config.search),
            timeout: Duration::from_secs(config.agent.tool_timeout_secs),
        }
    }

    /// Schemas for every tool, in the provider's tool shape
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new(
                codegen::NAME,
                CODE_GENERATOR_DESCRIPTION,
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Natural language description of the data processing task"
                        }
                    },
                    "required": ["query"]
                }),
            ),
            ToolDefinition::new(
                calculator::NAME,
                "Evaluate a math expression and return the numeric result as plain text",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "expression": {
                            "type": "string",
                            "description": "Math expression to evaluate, e.g. \"300 * 200\""
                        }
                    },
                    "required": ["expression"]
                }),
            ),
            ToolDefinition::new(
                search::NAME,
                "Search the web and return result titles, snippets, and URLs for citations",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The search query"
                        }
                    },
                    "required": ["query"]
                }),
            ),
        ]
    }

    /// Execute one tool call.
    ///
    /// Always produces an output for the originating call id: failures and
    /// timeouts are rendered as diagnostic content, never raised.
    pub async fn execute(&self, call: &ToolCall) -> ToolOutput {
        let invocation = match ToolInvocation::parse(call) {
            Ok(invocation) => invocation,
            Err(diagnostic) => return ToolOutput::new(&call.id, diagnostic),
        };

        match tokio::time::timeout(self.timeout, self.dispatch(invocation)).await {
            Ok(Ok(content)) => ToolOutput::new(&call.id, content),
            Ok(Err(e)) => ToolOutput::new(&call.id, format!("Tool '{}' failed: {}", call.name, e)),
            Err(_) => ToolOutput::new(
                &call.id,
                format!(
                    "Tool '{}' timed out after {}s",
                    call.name,
                    self.timeout.as_secs()
                ),
            ),
        }
    }

    async fn dispatch(&self, invocation: ToolInvocation) -> Result<String> {
        match invocation {
            ToolInvocation::CodeGenerator { query } => self.codegen.generate(&query).await,
            ToolInvocation::Calculator { expression } => self.calculator.evaluate(&expression),
            ToolInvocation::WebSearch { query } => self.search.search(&query).await,
        }
    }
}
