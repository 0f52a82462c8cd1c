//! Agent loop integration tests
//!
//! Drives the full loop against a scripted chat model: no network, no
//! credentials, deterministic replies.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use edp_assistant::agent::Assistant;
use edp_assistant::checkpoint::{Checkpointer, MemorySaver};
use edp_assistant::core::{
    AssistantError, Config, Result, ToolCall, ToolDefinition, Turn,
};
use edp_assistant::llm::{ChatModel, GenerateOptions, ModelReply};

/// Chat model that pops scripted replies in order
struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    invocations: AtomicUsize,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<ModelReply>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            invocations: AtomicUsize::new(0),
        })
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    fn next_reply(&self, model: &str) -> Result<ModelReply> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ModelReply::text("script exhausted", model)))
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(
        &self,
        model: &str,
        _system: &str,
        _turns: &[Turn],
        _options: Option<GenerateOptions>,
    ) -> Result<ModelReply> {
        self.next_reply(model)
    }

    async fn chat_with_tools(
        &self,
        model: &str,
        _system: &str,
        _turns: &[Turn],
        _tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<ModelReply> {
        self.next_reply(model)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn reply_with_calls(calls: Vec<ToolCall>) -> Result<ModelReply> {
    Ok(ModelReply {
        content: String::new(),
        tool_calls: calls,
        usage: None,
        model: "scripted".to_string(),
    })
}

fn reply_with_text(text: &str) -> Result<ModelReply> {
    Ok(ModelReply::text(text, "scripted"))
}

fn harness(
    replies: Vec<Result<ModelReply>>,
    max_steps: usize,
) -> (Assistant, Arc<MemorySaver>, Arc<ScriptedModel>) {
    let mut config = Config::default();
    config.agent.max_steps = max_steps;

    let model = ScriptedModel::new(replies);
    let saver = Arc::new(MemorySaver::new());
    let assistant = Assistant::with_parts(config, model.clone(), saver.clone());

    (assistant, saver, model)
}

fn tool_turns(turns: &[Turn]) -> Vec<(&str, &str)> {
    turns
        .iter()
        .filter_map(|t| match t {
            Turn::Tool { call_id, content } => Some((call_id.as_str(), content.as_str())),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn calculator_round_trip_produces_readable_answer() {
    let (assistant, saver, model) = harness(
        vec![
            reply_with_calls(vec![ToolCall::with_id(
                "toolu_calc",
                "calculator",
                serde_json::json!({"expression": "2+2"}),
            )]),
            reply_with_text("The result of 2+2 is 4"),
        ],
        10,
    );

    let thread_id = Uuid::new_v4();
    let answer = assistant.run(thread_id, "what is 2+2").await.unwrap();
    assert_eq!(answer, "The result of 2+2 is 4");
    assert_eq!(model.invocations(), 2);

    let state = saver.load(thread_id).await.unwrap().unwrap();
    // user, assistant(tool call), tool result, final assistant
    assert_eq!(state.len(), 4);
    assert_eq!(tool_turns(state.turns()), vec![("toolu_calc", "4")]);
}

#[tokio::test]
async fn exhausted_step_budget_forces_termination() {
    let (assistant, saver, model) = harness(
        vec![reply_with_calls(vec![ToolCall::with_id(
            "toolu_1",
            "calculator",
            serde_json::json!({"expression": "1+1"}),
        )])],
        1,
    );

    let thread_id = Uuid::new_v4();
    let answer = assistant.run(thread_id, "loop forever").await.unwrap();
    assert_eq!(answer, "Sorry, need more steps to process this request.");

    // tools were never dispatched and the model was not re-invoked
    assert_eq!(model.invocations(), 1);
    let state = saver.load(thread_id).await.unwrap().unwrap();
    assert!(tool_turns(state.turns()).is_empty());
    assert!(state.last_turn().unwrap().tool_calls().is_empty());
}

#[tokio::test]
async fn model_timeout_becomes_a_tagged_apology_turn() {
    let (assistant, saver, _model) =
        harness(vec![Err(AssistantError::ModelTimeout)], 10);

    let thread_id = Uuid::new_v4();
    let answer = assistant.run(thread_id, "slow question").await.unwrap();
    assert_eq!(
        answer,
        "Apologies, the response took too long. Please try a simpler query."
    );

    let state = saver.load(thread_id).await.unwrap().unwrap();
    let tag = state.last_turn().unwrap().error_tag().unwrap();
    assert_eq!(tag.as_str(), "MODEL_TIMEOUT");
}

#[tokio::test]
async fn permission_failure_is_not_leaked_verbatim() {
    let (assistant, saver, _model) = harness(
        vec![Err(AssistantError::PermissionDenied(
            "AccessDeniedException: arn:aws:iam::123:role/x".to_string(),
        ))],
        10,
    );

    let thread_id = Uuid::new_v4();
    let answer = assistant.run(thread_id, "hi").await.unwrap();
    assert_eq!(answer, "Authorization issue detected.");

    let state = saver.load(thread_id).await.unwrap().unwrap();
    assert!(!state.last_turn().unwrap().content().contains("arn:aws"));
    assert_eq!(
        state.last_turn().unwrap().error_tag().unwrap().as_str(),
        "AWS_PERMISSION"
    );
}

#[tokio::test]
async fn unknown_tool_yields_diagnostic_and_loop_continues() {
    let (assistant, saver, model) = harness(
        vec![
            reply_with_calls(vec![ToolCall::with_id(
                "toolu_x",
                "magic_wand",
                serde_json::json!({}),
            )]),
            reply_with_text("recovered"),
        ],
        10,
    );

    let thread_id = Uuid::new_v4();
    let answer = assistant.run(thread_id, "do magic").await.unwrap();
    assert_eq!(answer, "recovered");

    // the failure reached the model as tool-result content, not an abort
    assert_eq!(model.invocations(), 2);
    let state = saver.load(thread_id).await.unwrap().unwrap();
    assert_eq!(
        tool_turns(state.turns()),
        vec![("toolu_x", "Unknown tool: magic_wand")]
    );
}

#[tokio::test]
async fn concurrent_tool_calls_match_their_call_ids() {
    let (assistant, saver, _model) = harness(
        vec![
            reply_with_calls(vec![
                ToolCall::with_id(
                    "toolu_a",
                    "calculator",
                    serde_json::json!({"expression": "2+2"}),
                ),
                ToolCall::with_id(
                    "toolu_b",
                    "calculator",
                    serde_json::json!({"expression": "3*3"}),
                ),
            ]),
            reply_with_text("4 and 9"),
        ],
        10,
    );

    let thread_id = Uuid::new_v4();
    assistant.run(thread_id, "two sums").await.unwrap();

    let state = saver.load(thread_id).await.unwrap().unwrap();
    // one result per call, request order preserved
    assert_eq!(
        tool_turns(state.turns()),
        vec![("toolu_a", "4"), ("toolu_b", "9")]
    );
}

#[tokio::test]
async fn turn_log_grows_across_runs_on_one_thread() {
    let (assistant, saver, _model) = harness(
        vec![reply_with_text("first answer"), reply_with_text("second answer")],
        10,
    );

    let thread_id = Uuid::new_v4();

    assistant.run(thread_id, "first").await.unwrap();
    let after_first = saver.load(thread_id).await.unwrap().unwrap().len();

    assistant.run(thread_id, "second").await.unwrap();
    let after_second = saver.load(thread_id).await.unwrap().unwrap().len();

    assert_eq!(after_first, 2);
    assert_eq!(after_second, 4);
}

#[tokio::test]
async fn cancellation_stops_before_the_next_model_step() {
    let (assistant, _saver, model) = harness(vec![reply_with_text("never sent")], 10);

    assistant.cancel_flag().cancel();
    let err = assistant.run(Uuid::new_v4(), "hello").await.unwrap_err();
    assert!(matches!(err, AssistantError::Cancelled));
    assert_eq!(model.invocations(), 0);
}
