//! Custom error types for the assistant
//!
//! Provides a unified error handling system across all modules, plus the
//! user-facing error classification applied at the model invocation boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for assistant operations
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Bedrock connection or API errors
    #[error("Bedrock error: {0}")]
    Bedrock(String),

    /// The model provider did not respond in time
    #[error("model invocation timed out")]
    ModelTimeout,

    /// Credential or authorization failure at the provider
    #[error("provider authorization failure: {0}")]
    PermissionDenied(String),

    /// Tool execution errors
    #[error("tool execution error: {0}")]
    ToolExecution(String),

    /// Checkpoint store errors
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Model identifier not present in the model table
    #[error("unsupported model: {0}")]
    UnknownModel(String),

    /// The run was cancelled between steps
    #[error("run cancelled")]
    Cancelled,

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

impl AssistantError {
    /// Create a Bedrock error
    pub fn bedrock(msg: impl Into<String>) -> Self {
        Self::Bedrock(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify this error for the user-facing apology turn.
    ///
    /// Full detail stays server-side (logged by the caller); the user only
    /// ever sees the fixed message for the resulting tag.
    pub fn tag(&self) -> ErrorTag {
        match self {
            Self::ModelTimeout => ErrorTag::ModelTimeout,
            Self::Http(e) if e.is_timeout() => ErrorTag::ModelTimeout,
            Self::PermissionDenied(_) => ErrorTag::AwsPermission,
            _ => ErrorTag::Default,
        }
    }
}

/// User-facing error classification attached to substituted assistant turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorTag {
    #[serde(rename = "MODEL_TIMEOUT")]
    ModelTimeout,
    #[serde(rename = "AWS_PERMISSION")]
    AwsPermission,
    #[serde(rename = "DEFAULT")]
    Default,
}

impl ErrorTag {
    /// The fixed message shown to the user for this class of failure
    pub fn user_message(self) -> &'static str {
        match self {
            Self::ModelTimeout => {
                "Apologies, the response took too long. Please try a simpler query."
            }
            Self::AwsPermission => "Authorization issue detected.",
            Self::Default => "Unable to process request.",
        }
    }

    /// Stable tag string stored in turn metadata
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelTimeout => "MODEL_TIMEOUT",
            Self::AwsPermission => "AWS_PERMISSION",
            Self::Default => "DEFAULT",
        }
    }
}

impl std::fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        assert_eq!(AssistantError::ModelTimeout.tag(), ErrorTag::ModelTimeout);
        assert_eq!(
            ErrorTag::ModelTimeout.user_message(),
            "Apologies, the response took too long. Please try a simpler query."
        );
    }

    #[test]
    fn test_permission_classification() {
        let err = AssistantError::PermissionDenied("AccessDeniedException".into());
        assert_eq!(err.tag(), ErrorTag::AwsPermission);
        assert_eq!(err.tag().user_message(), "Authorization issue detected.");
    }

    #[test]
    fn test_default_classification() {
        let err = AssistantError::Other("boom".into());
        assert_eq!(err.tag(), ErrorTag::Default);
        assert_eq!(err.tag().user_message(), "Unable to process request.");
        assert_eq!(err.tag().to_string(), "DEFAULT");
    }

    #[test]
    fn test_tag_serde_rename() {
        let json = serde_json::to_string(&ErrorTag::ModelTimeout).unwrap();
        assert_eq!(json, "\"MODEL_TIMEOUT\"");
    }
}
