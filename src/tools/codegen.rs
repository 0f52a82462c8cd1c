//! SolveBio expression generator tool
//!
//! One bounded model invocation with the specialist system prompt. Results
//! are memoized in an explicit 100-entry LRU cache keyed by the normalized
//! query (trimmed, newlines stripped), so repeated phrasings of the same
//! request do not burn inference quota.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;

use crate::agent::prompts::CODE_GENERATOR_SYSTEM;
use crate::core::{AssistantError, Result, Turn};
use crate::llm::{ChatModel, GenerateOptions};

/// Tool name the model uses to request expression generation
pub const NAME: &str = "code_generator";

/// Cached queries before eviction
const CACHE_CAPACITY: usize = 100;

/// Natural language -> SolveBio expression generator
pub struct CodeGenerator {
    model: Arc<dyn ChatModel>,
    model_id: String,
    cache: Mutex<LruCache<String, String>>,
}

impl CodeGenerator {
    pub fn new(model: Arc<dyn ChatModel>, model_id: impl Into<String>) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).expect("cache capacity is non-zero");
        Self {
            model,
            model_id: model_id.into(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cache key normalization: trim and strip newlines
    fn normalize(query: &str) -> String {
        query.trim().replace('\n', "")
    }

    /// Generate an expression for a natural language request
    pub async fn generate(&self, query: &str) -> Result<String> {
        let key = Self::normalize(query);

        {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(&key) {
                return Ok(hit.clone());
            }
        }

        let reply = self
            .model
            .chat(
                &self.model_id,
                CODE_GENERATOR_SYSTEM,
                &[Turn::user(&key)],
                Some(GenerateOptions::bedrock_defaults()),
            )
            .await
            .map_err(|e| AssistantError::tool(format!("code generation failed: {}", e)))?;

        let expression = reply.content.trim().to_string();

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, expression.clone());

        Ok(expression)
    }
}
