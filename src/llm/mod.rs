//! LLM module - chat model integrations
//!
//! Provides the provider abstraction with the Bedrock runtime as the primary
//! backend, plus the bounded model binding cache.

pub mod bedrock;
pub mod binding;
pub mod traits;

pub use bedrock::BedrockClient;
pub use binding::{BoundModel, ModelCache};
pub use traits::{ChatModel, GenerateOptions, ModelReply, TokenUsage};
