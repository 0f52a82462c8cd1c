//! Checkpoint store
//!
//! Persists conversation state keyed by thread id, consulted at loop entry
//! and updated after every appended turn. Writers for a given thread are
//! serialized by construction: exactly one loop instance drives a thread at
//! a time, so a whole-state replace per save cannot lose updates.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::agent::ConversationState;
use crate::core::Result;

/// Persistence boundary for conversation state
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Load the state for a thread, or `None` for a fresh thread
    async fn load(&self, thread_id: Uuid) -> Result<Option<ConversationState>>;

    /// Replace the stored state for a thread
    async fn save(&self, thread_id: Uuid, state: &ConversationState) -> Result<()>;
}

/// In-process checkpoint store.
///
/// State lives for the process lifetime only; durability beyond that is out
/// of scope here.
#[derive(Debug, Default)]
pub struct MemorySaver {
    threads: RwLock<HashMap<Uuid, ConversationState>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads with stored state
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[async_trait]
impl Checkpointer for MemorySaver {
    async fn load(&self, thread_id: Uuid) -> Result<Option<ConversationState>> {
        Ok(self.threads.read().await.get(&thread_id).cloned())
    }

    async fn save(&self, thread_id: Uuid, state: &ConversationState) -> Result<()> {
        self.threads.write().await.insert(thread_id, state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Turn;

    #[test]
    fn test_absent_thread_loads_none() {
        tokio_test::block_on(async {
            let saver = MemorySaver::new();
            let loaded = saver.load(Uuid::new_v4()).await.unwrap();
            assert!(loaded.is_none());
        });
    }

    #[test]
    fn test_save_then_load_round_trip() {
        tokio_test::block_on(async {
            let saver = MemorySaver::new();
            let thread_id = Uuid::new_v4();

            let mut state = ConversationState::new(10);
            state.push(Turn::user("hello"));
            state.push(Turn::assistant("hi"));
            saver.save(thread_id, &state).await.unwrap();

            let loaded = saver.load(thread_id).await.unwrap().unwrap();
            assert_eq!(loaded.len(), 2);
            assert_eq!(loaded.last_assistant_text(), Some("hi"));
        });
    }

    #[test]
    fn test_threads_are_isolated() {
        tokio_test::block_on(async {
            let saver = MemorySaver::new();
            let a = Uuid::new_v4();
            let b = Uuid::new_v4();

            let mut state = ConversationState::new(10);
            state.push(Turn::user("only for a"));
            saver.save(a, &state).await.unwrap();

            assert!(saver.load(b).await.unwrap().is_none());
            assert_eq!(saver.thread_count().await, 1);
        });
    }
}
