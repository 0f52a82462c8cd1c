//! Chat model trait for abstracting the provider boundary
//!
//! The loop driver and the code generator tool only see this trait, so tests
//! can script replies without a network.

use async_trait::async_trait;

use crate::core::{Result, ToolCall, ToolDefinition, Turn};

/// Response from a chat model
#[derive(Debug, Clone)]
pub struct ModelReply {
    /// Text content of the reply
    pub content: String,
    /// Any tool calls the model wants to make
    pub tool_calls: Vec<ToolCall>,
    /// Token usage information
    pub usage: Option<TokenUsage>,
    /// Model that generated the reply
    pub model: String,
}

impl ModelReply {
    /// Create a plain text reply (useful in tests and fallbacks)
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            usage: None,
            model: model.into(),
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Options for model generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Nucleus sampling cutoff
    pub top_p: Option<f32>,
    /// Top-k sampling cutoff
    pub top_k: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

impl GenerateOptions {
    /// The generation parameters used against Bedrock-hosted Claude models
    pub fn bedrock_defaults() -> Self {
        Self {
            temperature: Some(0.5),
            max_tokens: Some(4096),
            top_p: Some(1.0),
            top_k: Some(250),
            stop: Some(vec!["\n\nHuman:".to_string()]),
        }
    }
}

/// Trait for chat model providers
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Request a completion for the given turns
    async fn chat(
        &self,
        model: &str,
        system: &str,
        turns: &[Turn],
        options: Option<GenerateOptions>,
    ) -> Result<ModelReply>;

    /// Request a completion, permitting the model to emit tool calls
    async fn chat_with_tools(
        &self,
        model: &str,
        system: &str,
        turns: &[Turn],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<ModelReply>;

    /// Get the provider name
    fn name(&self) -> &str;
}
