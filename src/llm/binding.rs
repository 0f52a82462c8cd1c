//! Model binding cache
//!
//! A bound model is a resolved Bedrock model id plus the generation options
//! and tool schemas it was bound with. Bindings are memoized in an explicit,
//! bounded cache owned by the loop driver rather than a process-wide
//! singleton; keys are normalized (trimmed, ASCII-lowercased) so alias
//! spelling variants share one entry.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

use lru::LruCache;

use crate::core::{Result, ToolDefinition};
use crate::llm::traits::GenerateOptions;

/// Default number of cached bindings
pub const DEFAULT_CAPACITY: usize = 8;

/// A chat model bound to its generation options and tool schemas
#[derive(Debug, Clone)]
pub struct BoundModel {
    /// Resolved Bedrock model id
    pub model_id: String,
    /// Generation options applied to every invocation
    pub options: GenerateOptions,
    /// Tool schemas offered to the model
    pub tools: Vec<ToolDefinition>,
}

/// Bounded alias -> BoundModel cache
pub struct ModelCache {
    entries: Mutex<LruCache<String, Arc<BoundModel>>>,
}

impl ModelCache {
    /// Create a cache holding at most `capacity` bindings
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cache key normalization: trim and ASCII-lowercase the alias
    pub fn normalize(alias: &str) -> String {
        alias.trim().to_ascii_lowercase()
    }

    /// Look up a binding, building and inserting it on a miss
    pub fn get_or_bind(
        &self,
        alias: &str,
        bind: impl FnOnce() -> Result<BoundModel>,
    ) -> Result<Arc<BoundModel>> {
        let key = Self::normalize(alias);

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bound) = entries.get(&key) {
            return Ok(bound.clone());
        }

        let bound = Arc::new(bind()?);
        entries.put(key, bound.clone());
        Ok(bound)
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
