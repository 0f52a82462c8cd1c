//! Shared types used across the assistant
//!
//! Contains conversation turns, tool calls, and tool schemas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::ErrorTag;

/// One message in a conversation.
///
/// The turn log is append-only: a turn is never mutated once it has been
/// pushed onto a [`ConversationState`](crate::agent::ConversationState).
/// The serialized form tags each variant with a `role` field, matching the
/// shape checkpoints are stored in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Turn {
    /// A system instruction block.
    System { content: String },
    /// A user message.
    User { content: String },
    /// A model reply, optionally requesting tool invocations.
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
        /// Error classification when this turn replaced a failed invocation.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorTag>,
    },
    /// The result of one tool call, matched by `call_id`.
    Tool { call_id: String, content: String },
}

impl Turn {
    /// Create a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Create a plain assistant turn with no tool calls
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
            error: None,
        }
    }

    /// Create an assistant turn carrying tool calls
    pub fn assistant_reply(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
            error: None,
        }
    }

    /// Create the assistant turn substituted for a failed model invocation
    pub fn assistant_error(tag: ErrorTag) -> Self {
        Self::Assistant {
            content: tag.user_message().to_string(),
            tool_calls: Vec::new(),
            error: Some(tag),
        }
    }

    /// Create a tool-result turn
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            call_id: call_id.into(),
            content: content.into(),
        }
    }

    /// Whether this is an assistant turn
    pub fn is_assistant(&self) -> bool {
        matches!(self, Self::Assistant { .. })
    }

    /// Tool calls carried by this turn (empty for non-assistant turns)
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// Text content of this turn
    pub fn content(&self) -> &str {
        match self {
            Self::System { content }
            | Self::User { content }
            | Self::Assistant { content, .. }
            | Self::Tool { content, .. } => content,
        }
    }

    /// Error tag attached to this turn, if any
    pub fn error_tag(&self) -> Option<ErrorTag> {
        match self {
            Self::Assistant { error, .. } => *error,
            _ => None,
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call identifier, echoed back in the result
    pub id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call with a fresh identifier
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: format!("toolu_{}", Uuid::new_v4().simple()),
            name: name.into(),
            arguments,
        }
    }

    /// Create a tool call with an explicit identifier
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.arguments
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

/// Output of executing a single tool call
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Identifier of the originating call
    pub call_id: String,
    /// Result text, or a short diagnostic on failure
    pub content: String,
}

impl ToolOutput {
    pub fn new(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
        }
    }
}

/// Schema of a tool exposed to the model (Anthropic tool shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Name the model uses to request this tool
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// JSON Schema for the arguments
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}
