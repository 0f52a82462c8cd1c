//! Conversation state
//!
//! The append-only turn log plus the remaining-step budget for one thread.
//! Owned exclusively by that thread's loop driver; the checkpoint store only
//! ever sees it as a value.

use serde::{Deserialize, Serialize};

use crate::core::{ToolCall, Turn};

/// State of one conversation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    /// Append-only turn log
    turns: Vec<Turn>,
    /// Model invocations left before forced termination
    remaining_steps: usize,
}

impl ConversationState {
    /// Create an empty conversation with the given step budget
    pub fn new(budget: usize) -> Self {
        Self {
            turns: Vec::new(),
            remaining_steps: budget,
        }
    }

    /// Append a turn. Turns are never mutated or removed afterwards.
    pub(crate) fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Consume one step of the budget
    pub(crate) fn consume_step(&mut self) {
        self.remaining_steps = self.remaining_steps.saturating_sub(1);
    }

    /// Reset the budget at the start of a run
    pub(crate) fn reset_budget(&mut self, budget: usize) {
        self.remaining_steps = budget;
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Steps left in the budget
    pub fn remaining_steps(&self) -> usize {
        self.remaining_steps
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recently appended turn
    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Text of the most recent assistant turn
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.is_assistant())
            .map(|t| t.content())
    }

    /// Tool calls requested by the last turn (empty unless it is an
    /// assistant turn carrying calls)
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        self.last_turn().map(Turn::tool_calls).unwrap_or(&[])
    }

    /// Calls from the most recent assistant turn that have no matching
    /// tool-result turn yet.
    ///
    /// The provider rejects a history where an assistant turn's calls are
    /// not all answered before the next assistant turn, so the driver must
    /// drain this to empty before invoking the model again.
    pub fn unanswered_tool_calls(&self) -> Vec<&ToolCall> {
        let Some(last_assistant) = self.turns.iter().rposition(Turn::is_assistant) else {
            return Vec::new();
        };

        let answered: Vec<&str> = self.turns[last_assistant + 1..]
            .iter()
            .filter_map(|t| match t {
                Turn::Tool { call_id, .. } => Some(call_id.as_str()),
                _ => None,
            })
            .collect();

        self.turns[last_assistant]
            .tool_calls()
            .iter()
            .filter(|call| !answered.contains(&call.id.as_str()))
            .collect()
    }
}
