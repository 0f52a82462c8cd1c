//! Loop driver
//!
//! Drives one conversation thread through the model/tools state machine:
//! invoke the model, route on its reply, execute any requested tools, feed
//! the results back, stop when the model stops asking. Checkpoints are
//! written after every appended turn.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use uuid::Uuid;

use crate::agent::conversation::ConversationState;
use crate::agent::flow::{route, CancelFlag, FlowState};
use crate::agent::prompts::{system_instructions, NEED_MORE_STEPS};
use crate::checkpoint::{Checkpointer, MemorySaver};
use crate::core::{AssistantError, Config, Result, ToolCall, ToolOutput, Turn};
use crate::llm::{BedrockClient, BoundModel, ChatModel, GenerateOptions, ModelCache};
use crate::tools::ToolRegistry;

/// Force-terminate instead of dispatching tools below this many steps
const STEP_RESERVE: usize = 2;

/// The conversational assistant: model, tools, and checkpointing wired to
/// the loop state machine
pub struct Assistant {
    config: Config,
    chat: Arc<dyn ChatModel>,
    tools: Arc<ToolRegistry>,
    models: ModelCache,
    checkpoints: Arc<dyn Checkpointer>,
    cancel: CancelFlag,
}

impl Assistant {
    /// Create an assistant against the Bedrock runtime with in-process
    /// checkpointing
    pub fn new(config: Config) -> Result<Self> {
        let chat = Arc::new(BedrockClient::from_config(&config)?);
        Ok(Self::with_parts(config, chat, Arc::new(MemorySaver::new())))
    }

    /// Create an assistant from explicit collaborators
    pub fn with_parts(
        config: Config,
        chat: Arc<dyn ChatModel>,
        checkpoints: Arc<dyn Checkpointer>,
    ) -> Self {
        let tools = Arc::new(ToolRegistry::from_config(&config, chat.clone()));

        Self {
            config,
            chat,
            tools,
            models: ModelCache::default(),
            checkpoints,
            cancel: CancelFlag::new(),
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Handle for cancelling this assistant's runs between steps
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Number of turns stored for a thread
    pub async fn thread_len(&self, thread_id: Uuid) -> Result<usize> {
        Ok(self
            .checkpoints
            .load(thread_id)
            .await?
            .map(|s| s.len())
            .unwrap_or(0))
    }

    /// Process one user message to completion and return the final
    /// assistant text.
    ///
    /// The loop advances strictly sequentially; the only parallelism is
    /// between tool calls of a single assistant turn.
    pub async fn run(&self, thread_id: Uuid, user_message: &str) -> Result<String> {
        let mut state = self
            .checkpoints
            .load(thread_id)
            .await?
            .unwrap_or_else(|| ConversationState::new(self.config.agent.max_steps));

        // the step budget bounds one run, not the thread's lifetime
        state.reset_budget(self.config.agent.max_steps);
        state.push(Turn::user(user_message));
        self.checkpoints.save(thread_id, &state).await?;

        let mut flow = FlowState::Model;

        while flow != FlowState::Done {
            flow = match flow {
                FlowState::Model => {
                    if self.cancel.is_cancelled() {
                        return Err(AssistantError::Cancelled);
                    }

                    let turn = self.invoke_model(&state).await;
                    state.consume_step();
                    state.push(turn);
                    self.checkpoints.save(thread_id, &state).await?;

                    FlowState::Model.advance(route(state.last_turn()))
                }
                FlowState::Tools => {
                    let calls = state.pending_tool_calls().to_vec();
                    for output in self.execute_tools(&calls).await {
                        state.push(Turn::tool(output.call_id, output.content));
                        self.checkpoints.save(thread_id, &state).await?;
                    }

                    debug_assert!(state.unanswered_tool_calls().is_empty());
                    FlowState::Model
                }
                FlowState::Done => FlowState::Done,
            };
        }

        Ok(state.last_assistant_text().unwrap_or_default().to_string())
    }

    /// Model invocation step.
    ///
    /// Never raises past this boundary: failures are classified into a
    /// short user-facing turn carrying the error tag.
    async fn invoke_model(&self, state: &ConversationState) -> Turn {
        match self.try_invoke_model(state).await {
            Ok(turn) => turn,
            Err(e) => {
                eprintln!("model invocation failed: {}", e);
                Turn::assistant_error(e.tag())
            }
        }
    }

    async fn try_invoke_model(&self, state: &ConversationState) -> Result<Turn> {
        let bound = self.bound_model()?;

        let system = match &self.config.agent.system_prompt {
            Some(prompt) => prompt.clone(),
            None => system_instructions(),
        };

        let reply = self
            .chat
            .chat_with_tools(
                &bound.model_id,
                &system,
                state.turns(),
                &bound.tools,
                Some(bound.options.clone()),
            )
            .await?;

        // never dispatch tools the budget cannot pay for
        if state.remaining_steps() < STEP_RESERVE && !reply.tool_calls.is_empty() {
            return Ok(Turn::assistant(NEED_MORE_STEPS));
        }

        Ok(Turn::assistant_reply(reply.content, reply.tool_calls))
    }

    fn bound_model(&self) -> Result<Arc<BoundModel>> {
        let alias = &self.config.models.default;
        self.models.get_or_bind(alias, || {
            Ok(BoundModel {
                model_id: self.config.resolve_model(alias)?,
                options: GenerateOptions::bedrock_defaults(),
                tools: self.tools.definitions(),
            })
        })
    }

    /// Tool execution step.
    ///
    /// Calls from one assistant turn are independent by construction, so
    /// they dispatch concurrently; every call gets exactly one output,
    /// matched by call id, in the original request order.
    async fn execute_tools(&self, calls: &[ToolCall]) -> Vec<ToolOutput> {
        let mut set: JoinSet<(String, ToolOutput)> = JoinSet::new();

        for call in calls.iter().cloned() {
            let tools = self.tools.clone();
            set.spawn(async move {
                let output = tools.execute(&call).await;
                (call.id, output)
            });
        }

        let mut by_id: HashMap<String, ToolOutput> = HashMap::with_capacity(calls.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((id, output)) => {
                    by_id.insert(id, output);
                }
                Err(e) => {
                    if self.config.agent.debug {
                        eprintln!("DEBUG tool task aborted: {}", e);
                    }
                }
            }
        }

        calls
            .iter()
            .map(|call| {
                by_id.remove(&call.id).unwrap_or_else(|| {
                    ToolOutput::new(&call.id, format!("Tool '{}' failed: task aborted", call.name))
                })
            })
            .collect()
    }
}
