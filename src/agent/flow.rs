//! Loop flow control
//!
//! The agent loop as an explicit finite-state machine: `Model` invokes the
//! chat model, `Tools` executes requested tool calls, `Done` is terminal.
//! Routing inspects the last turn only and always terminates on anything
//! unexpected.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::Turn;

/// States of the agent loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Invoke the chat model
    Model,
    /// Execute pending tool calls
    Tools,
    /// Terminal
    Done,
}

/// Outcome of the routing decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Tools,
    Done,
}

/// Decide where the loop goes after a model invocation.
///
/// Pure and total: any input that is not an assistant turn with tool calls
/// routes to `Done`. The fail-safe direction is termination, never another
/// model invocation.
pub fn route(last_turn: Option<&Turn>) -> Route {
    match last_turn {
        Some(turn @ Turn::Assistant { .. }) => {
            if turn.tool_calls().is_empty() {
                Route::Done
            } else {
                Route::Tools
            }
        }
        other => {
            eprintln!(
                "Warning: routing expected an assistant turn, got {:?}; terminating",
                other.map(|t| t.content())
            );
            Route::Done
        }
    }
}

impl FlowState {
    /// Transition table.
    ///
    /// `Model` branches on the routing decision, `Tools` always returns to
    /// `Model`, `Done` absorbs.
    pub fn advance(self, route: Route) -> FlowState {
        match (self, route) {
            (FlowState::Model, Route::Tools) => FlowState::Tools,
            (FlowState::Model, Route::Done) => FlowState::Done,
            (FlowState::Tools, _) => FlowState::Model,
            (FlowState::Done, _) => FlowState::Done,
        }
    }
}

/// Cooperative cancellation signal.
///
/// Checked between steps; an in-flight provider call is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation before the next model invocation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolCall;

    #[test]
    fn test_route_on_tool_calls() {
        let call = ToolCall::with_id("a", "calculator", serde_json::json!({"expression": "2+2"}));
        let turn = Turn::assistant_reply("", vec![call]);
        assert_eq!(route(Some(&turn)), Route::Tools);
    }

    #[test]
    fn test_route_on_plain_reply() {
        let turn = Turn::assistant("all done");
        assert_eq!(route(Some(&turn)), Route::Done);
    }

    #[test]
    fn test_route_is_total_on_malformed_input() {
        assert_eq!(route(None), Route::Done);
        assert_eq!(route(Some(&Turn::user("hi"))), Route::Done);
        assert_eq!(route(Some(&Turn::tool("a", "4"))), Route::Done);
    }

    #[test]
    fn test_route_is_idempotent() {
        let turn = Turn::assistant("final");
        assert_eq!(route(Some(&turn)), route(Some(&turn)));
    }

    #[test]
    fn test_transition_table() {
        assert_eq!(FlowState::Model.advance(Route::Tools), FlowState::Tools);
        assert_eq!(FlowState::Model.advance(Route::Done), FlowState::Done);
        assert_eq!(FlowState::Tools.advance(Route::Done), FlowState::Model);
        assert_eq!(FlowState::Tools.advance(Route::Tools), FlowState::Model);
        assert_eq!(FlowState::Done.advance(Route::Tools), FlowState::Done);
    }

    #[test]
    fn test_cancel_flag() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());

        let shared = flag.clone();
        shared.cancel();
        assert!(flag.is_cancelled());
    }
}
