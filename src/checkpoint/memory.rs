//! In-memory thread store.
//!
//! Threads vanish when the process exits.

use super::ThreadStore;
use crate::agent::Message;
use crate::error::{Result, SnakkError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory thread store.
pub struct MemoryThreadStore {
    threads: RwLock<HashMap<String, Vec<Message>>>,
}

impl MemoryThreadStore {
    /// Create a new in-memory thread store.
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> SnakkError {
    SnakkError::Checkpoint(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn load(&self, thread_id: &str) -> Result<Vec<Message>> {
        let threads = self.threads.read().map_err(poisoned)?;
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }

    async fn save(&self, thread_id: &str, messages: &[Message]) -> Result<()> {
        let mut threads = self.threads.write().map_err(poisoned)?;
        threads.insert(thread_id.to_string(), messages.to_vec());
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<bool> {
        let mut threads = self.threads.write().map_err(poisoned)?;
        Ok(threads.remove(thread_id).is_some())
    }

    async fn clear(&self) -> Result<usize> {
        let mut threads = self.threads.write().map_err(poisoned)?;
        let count = threads.len();
        threads.clear();
        Ok(count)
    }

    async fn thread_ids(&self) -> Result<Vec<String>> {
        let threads = self.threads.read().map_err(poisoned)?;
        let mut ids: Vec<String> = threads.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
