//! SQLite-based thread store.
//!
//! Each thread is one row holding its history as JSON.

use super::ThreadStore;
use crate::agent::Message;
use crate::error::{Result, SnakkError};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS threads (
        thread_id TEXT PRIMARY KEY,
        messages_json TEXT NOT NULL,
        message_count INTEGER NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_threads_updated_at ON threads(updated_at);
"#;

/// SQLite-based thread store.
pub struct SqliteThreadStore {
    conn: Mutex<Connection>,
}

impl SqliteThreadStore {
    /// Open (or create) a thread store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite thread store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite thread store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SnakkError::Checkpoint(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl ThreadStore for SqliteThreadStore {
    #[instrument(skip(self))]
    async fn load(&self, thread_id: &str) -> Result<Vec<Message>> {
        let conn = self.lock()?;

        let json: Option<String> = conn
            .query_row(
                "SELECT messages_json FROM threads WHERE thread_id = ?1",
                params![thread_id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self, messages), fields(count = messages.len()))]
    async fn save(&self, thread_id: &str, messages: &[Message]) -> Result<()> {
        let json = serde_json::to_string(messages)?;
        let conn = self.lock()?;

        conn.execute(
            r#"
            INSERT INTO threads (thread_id, messages_json, message_count, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(thread_id) DO UPDATE SET
                messages_json = excluded.messages_json,
                message_count = excluded.message_count,
                updated_at = excluded.updated_at
            "#,
            params![
                thread_id,
                json,
                messages.len() as i64,
                Utc::now().to_rfc3339()
            ],
        )?;

        debug!("Saved thread {}", thread_id);
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM threads WHERE thread_id = ?1", params![thread_id])?;
        Ok(deleted > 0)
    }

    async fn clear(&self) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM threads", [])?;
        Ok(deleted)
    }

    async fn thread_ids(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT thread_id FROM threads ORDER BY thread_id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let ids = rows.collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ToolInvocation;

    #[tokio::test]
    async fn test_sqlite_thread_store() {
        let store = SqliteThreadStore::in_memory().unwrap();

        let history = vec![
            Message::user("weather in Paris"),
            Message::Assistant {
                content: None,
                tool_calls: vec![ToolInvocation {
                    id: "call_1".to_string(),
                    name: "web_search".to_string(),
                    arguments: r#"{"query":"weather in Paris"}"#.to_string(),
                }],
            },
            Message::tool_result("call_1", "Sunny"),
            Message::assistant("It is sunny."),
        ];

        store.save("t1", &history).await.unwrap();
        assert_eq!(store.load("t1").await.unwrap(), history);

        store.save("t1", &history[..1]).await.unwrap();
        assert_eq!(store.load("t1").await.unwrap().len(), 1);

        assert!(store.load("t2").await.unwrap().is_empty());
        assert!(store.delete("t1").await.unwrap());
        assert!(store.thread_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_thread_ids_reports_undecodable_rows() {
        let store = SqliteThreadStore::in_memory().unwrap();
        store.save("ok", &[Message::user("hi")]).await.unwrap();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO threads (thread_id, messages_json, message_count, updated_at) VALUES (NULL, '[]', 0, 'now')",
                [],
            )
            .unwrap();

        assert!(store.thread_ids().await.is_err());
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("threads.db");

        {
            let store = SqliteThreadStore::new(&path).unwrap();
            store.save("keep", &[Message::user("remember me")]).await.unwrap();
        }

        let store = SqliteThreadStore::new(&path).unwrap();
        let history = store.load("keep").await.unwrap();
        assert_eq!(history[0].text(), "remember me");
        assert_eq!(store.clear().await.unwrap(), 1);
    }
}
