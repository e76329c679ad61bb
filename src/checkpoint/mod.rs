//! Conversation checkpoints keyed by thread id.
//!
//! Provides a trait-based interface for different persistence backends.

mod memory;
mod sqlite;

pub use memory::MemoryThreadStore;
pub use sqlite::SqliteThreadStore;

use crate::agent::Message;
use crate::config::{CheckpointProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for thread history backends.
///
/// Histories never include the system prompt; the session prepends it on
/// every run.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Load the history for a thread. Unknown threads have an empty history.
    async fn load(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Replace the history for a thread.
    async fn save(&self, thread_id: &str, messages: &[Message]) -> Result<()>;

    /// Delete a thread. Returns whether it existed.
    async fn delete(&self, thread_id: &str) -> Result<bool>;

    /// Delete every thread. Returns how many were removed.
    async fn clear(&self) -> Result<usize>;

    /// Ids of all stored threads.
    async fn thread_ids(&self) -> Result<Vec<String>>;
}

/// Open the store configured in settings.
pub fn open(settings: &Settings) -> Result<Arc<dyn ThreadStore>> {
    match settings.checkpoint.provider {
        CheckpointProvider::Memory => Ok(Arc::new(MemoryThreadStore::new())),
        CheckpointProvider::Sqlite => Ok(Arc::new(SqliteThreadStore::new(&settings.sqlite_path())?)),
    }
}
