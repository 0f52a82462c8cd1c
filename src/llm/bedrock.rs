//! Bedrock runtime client
//!
//! Async HTTP client for Anthropic models hosted on the Bedrock runtime,
//! using the messages format with tool-use content blocks. Authentication
//! uses a Bedrock API key (bearer token) from the environment.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::core::{AssistantError, Config, Result, ToolCall, ToolDefinition, Turn};
use crate::llm::traits::{ChatModel, GenerateOptions, ModelReply, TokenUsage};

/// Environment variable holding the Bedrock API key
pub const API_KEY_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Bedrock runtime API client
#[derive(Clone)]
pub struct BedrockClient {
    client: Client,
    endpoint: String,
    api_key: String,
    /// Bounds simultaneous outbound inference requests, system-wide
    permits: Arc<Semaphore>,
    debug: bool,
}

/// Invoke request body (Anthropic messages format)
#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

/// One message in the provider wire format
#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ContentBlock>,
}

/// Content block in the provider wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

/// Invoke response body
#[derive(Debug, Deserialize)]
struct InvokeResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// AWS error body shape
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default, rename = "__type")]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl BedrockClient {
    /// Create a client from configuration.
    ///
    /// Fails at startup when the API key is absent; this is the only place
    /// a credential problem is allowed to abort instead of being classified.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| {
            AssistantError::config(format!("missing {} in environment", API_KEY_ENV))
        })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.bedrock.connect_timeout_secs))
            .timeout(Duration::from_secs(config.bedrock.read_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.runtime_endpoint(),
            api_key,
            permits: Arc::new(Semaphore::new(config.bedrock.max_concurrent_requests)),
            debug: config.agent.debug,
        })
    }

    /// Convert turns to wire messages.
    ///
    /// System turns are omitted (instructions travel in the `system` field),
    /// and consecutive same-role messages are merged: the provider requires
    /// every tool result for an assistant turn inside the single following
    /// user message.
    fn to_api_messages(turns: &[Turn]) -> Vec<ApiMessage> {
        let mut messages: Vec<ApiMessage> = Vec::with_capacity(turns.len());

        for turn in turns {
            let (role, blocks): (&'static str, Vec<ContentBlock>) = match turn {
                Turn::System { .. } => continue,
                Turn::User { content } => (
                    "user",
                    vec![ContentBlock::Text {
                        text: content.clone(),
                    }],
                ),
                Turn::Assistant {
                    content,
                    tool_calls,
                    ..
                } => {
                    let mut blocks = Vec::with_capacity(1 + tool_calls.len());
                    if !content.is_empty() {
                        blocks.push(ContentBlock::Text {
                            text: content.clone(),
                        });
                    }
                    for call in tool_calls {
                        blocks.push(ContentBlock::ToolUse {
                            id: call.id.clone(),
                            name: call.name.clone(),
                            input: call.arguments.clone(),
                        });
                    }
                    ("assistant", blocks)
                }
                Turn::Tool { call_id, content } => (
                    "user",
                    vec![ContentBlock::ToolResult {
                        tool_use_id: call_id.clone(),
                        content: content.clone(),
                    }],
                ),
            };

            match messages.last_mut() {
                Some(last) if last.role == role => last.content.extend(blocks),
                _ => messages.push(ApiMessage {
                    role,
                    content: blocks,
                }),
            }
        }

        messages
    }

    /// Convert a wire response to a ModelReply
    fn to_reply(response: InvokeResponse, requested_model: &str) -> ModelReply {
        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for block in response.content {
            match block {
                ContentBlock::Text { text } => {
                    if !content.is_empty() {
                        content.push('\n');
                    }
                    content.push_str(&text);
                }
                ContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall::with_id(id, name, input));
                }
                ContentBlock::ToolResult { .. } => {}
            }
        }

        let usage = response.usage.map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        });

        ModelReply {
            content,
            tool_calls,
            usage,
            model: response.model.unwrap_or_else(|| requested_model.to_string()),
        }
    }

    /// Debug print if enabled
    fn debug_print(&self, label: &str, content: &str) {
        if self.debug {
            if content.len() > 500 {
                eprintln!("DEBUG {}: {}...", label, &content[..500]);
            } else {
                eprintln!("DEBUG {}: {}", label, content);
            }
        }
    }

    /// Classify a non-success HTTP response into the error taxonomy
    fn classify_failure(status: reqwest::StatusCode, body: &str) -> AssistantError {
        let parsed: Option<ApiError> = serde_json::from_str(body).ok();
        let error_type = parsed
            .as_ref()
            .and_then(|e| e.error_type.as_deref())
            .unwrap_or("");
        let message = parsed
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| body.to_string());

        if status == reqwest::StatusCode::FORBIDDEN || error_type.contains("AccessDenied") {
            AssistantError::PermissionDenied(message)
        } else if error_type.contains("Timeout") {
            AssistantError::ModelTimeout
        } else {
            AssistantError::bedrock(format!("{}: {}", status, message))
        }
    }

    async fn invoke(
        &self,
        model: &str,
        system: &str,
        turns: &[Turn],
        tools: Option<&[ToolDefinition]>,
        options: Option<GenerateOptions>,
    ) -> Result<ModelReply> {
        let options = options.unwrap_or_else(GenerateOptions::bedrock_defaults);

        let request = InvokeRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: options.max_tokens.unwrap_or(4096),
            system,
            messages: Self::to_api_messages(turns),
            tools: tools.filter(|t| !t.is_empty()),
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            stop_sequences: options.stop,
        };

        let request_json = serde_json::to_string(&request)?;
        self.debug_print("Invoke Request", &request_json);

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AssistantError::Other("inference semaphore closed".to_string()))?;

        let response = self
            .client
            .post(format!("{}/model/{}/invoke", self.endpoint, model))
            .bearer_auth(&self.api_key)
            .header("accept", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantError::ModelTimeout
                } else {
                    AssistantError::Http(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AssistantError::ModelTimeout
            } else {
                AssistantError::Http(e)
            }
        })?;

        if !status.is_success() {
            return Err(Self::classify_failure(status, &body));
        }

        self.debug_print("Invoke Response", &body);

        let parsed: InvokeResponse = serde_json::from_str(&body)?;
        Ok(Self::to_reply(parsed, model))
    }
}

#[async_trait]
impl ChatModel for BedrockClient {
    async fn chat(
        &self,
        model: &str,
        system: &str,
        turns: &[Turn],
        options: Option<GenerateOptions>,
    ) -> Result<ModelReply> {
        self.invoke(model, system, turns, None, options).await
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        system: &str,
        turns: &[Turn],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<ModelReply> {
        self.invoke(model, system, turns, Some(tools), options).await
    }

    fn name(&self) -> &str {
        "bedrock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_results_merge_into_one_user_message() {
        let turns = vec![
            Turn::user("what is 2+2 and 3+3"),
            Turn::assistant_reply(
                "",
                vec![
                    ToolCall::with_id("a", "calculator", serde_json::json!({"expression": "2+2"})),
                    ToolCall::with_id("b", "calculator", serde_json::json!({"expression": "3+3"})),
                ],
            ),
            Turn::tool("a", "4"),
            Turn::tool("b", "6"),
        ];

        let messages = BedrockClient::to_api_messages(&turns);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].content.len(), 2);
        // both tool results must land in the single following user message
        assert_eq!(messages[2].role, "user");
        assert_eq!(messages[2].content.len(), 2);
    }

    #[test]
    fn test_system_turns_not_sent_inline() {
        let turns = vec![Turn::system("instructions"), Turn::user("hi")];
        let messages = BedrockClient::to_api_messages(&turns);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_reply_collects_text_and_tool_use() {
        let response = InvokeResponse {
            content: vec![
                ContentBlock::Text {
                    text: "Let me calculate that.".to_string(),
                },
                ContentBlock::ToolUse {
                    id: "toolu_1".to_string(),
                    name: "calculator".to_string(),
                    input: serde_json::json!({"expression": "2+2"}),
                },
            ],
            model: Some("claude".to_string()),
            usage: None,
        };

        let reply = BedrockClient::to_reply(response, "fallback");
        assert_eq!(reply.content, "Let me calculate that.");
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].id, "toolu_1");
    }

    #[test]
    fn test_access_denied_classification() {
        let err = BedrockClient::classify_failure(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"__type":"AccessDeniedException","message":"no"}"#,
        );
        assert!(matches!(err, AssistantError::PermissionDenied(_)));

        let err = BedrockClient::classify_failure(
            reqwest::StatusCode::REQUEST_TIMEOUT,
            r#"{"__type":"ModelTimeoutException"}"#,
        );
        assert!(matches!(err, AssistantError::ModelTimeout));
    }
}
