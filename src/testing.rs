//! Test doubles for the model and search backends.

use crate::agent::{Message, ToolInvocation, WEB_SEARCH};
use crate::error::{Result, SnakkError};
use crate::model::{ChatModel, ModelChunk, ModelStream, ModelTurn, ToolSpec};
use crate::retry::RetryPolicy;
use crate::search::{SearchHit, WebSearch};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A model that replays prepared turns and records what it was sent.
pub struct ScriptedModel {
    turns: Mutex<VecDeque<ModelTurn>>,
    repeat: Option<ModelTurn>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new(turns: Vec<ModelTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A model that returns the same turn forever.
    pub fn repeating(turn: ModelTurn) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            repeat: Some(turn),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every conversation the model has been asked to continue.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    fn next_turn(&self, messages: &[Message]) -> Result<ModelTurn> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.repeat.clone())
            .ok_or_else(|| SnakkError::OpenAI("script exhausted".to_string()))
    }
}

/// Split a turn the way a streaming API would: a role-only empty token,
/// word-sized text fragments, then tool calls in two pieces each.
fn to_chunks(turn: ModelTurn) -> Vec<ModelChunk> {
    let mut chunks = vec![ModelChunk::Token(String::new())];

    if let Some(content) = turn.content {
        let words: Vec<&str> = content.split(' ').collect();
        for (i, word) in words.iter().enumerate() {
            let text = if i + 1 < words.len() {
                format!("{} ", word)
            } else {
                word.to_string()
            };
            chunks.push(ModelChunk::Token(text));
        }
    }

    for (index, call) in turn.tool_calls.into_iter().enumerate() {
        let split = call.arguments.len() / 2;
        let (head, tail) = call.arguments.split_at(split);
        chunks.push(ModelChunk::ToolCall {
            index: index as u32,
            id: Some(call.id.clone()),
            name: Some(call.name.clone()),
            arguments: head.to_string(),
        });
        chunks.push(ModelChunk::ToolCall {
            index: index as u32,
            id: None,
            name: None,
            arguments: tail.to_string(),
        });
    }

    chunks
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<ModelTurn> {
        self.next_turn(messages)
    }

    async fn stream(&self, messages: &[Message], _tools: &[ToolSpec]) -> Result<ModelStream> {
        let chunks = to_chunks(self.next_turn(messages)?);
        Ok(Box::pin(futures::stream::iter(chunks.into_iter().map(Ok))))
    }
}

/// A search backend with a fixed answer that can be told to fail first.
#[derive(Clone)]
pub struct StubSearch {
    hits: Vec<SearchHit>,
    failures_left: Arc<AtomicU32>,
    attempts: Arc<AtomicU32>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StubSearch {
    /// Always answers with a sunny Paris forecast.
    pub fn forecast() -> Self {
        Self {
            hits: vec![SearchHit {
                title: "Paris weather".to_string(),
                url: "https://weather.example/paris".to_string(),
                content: "Sunny, 21°C, light breeze.".to_string(),
                score: 0.93,
            }],
            failures_left: Arc::new(AtomicU32::new(0)),
            attempts: Arc::new(AtomicU32::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the next `count` searches with a backend error.
    pub fn failing(self, count: u32) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    /// Total search attempts, failed ones included.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Queries that succeeded.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for StubSearch {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<SearchHit>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(SnakkError::Search("503 Service Unavailable".to_string()));
        }

        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.hits.iter().take(max_results as usize).cloned().collect())
    }
}

/// A retry policy with millisecond delays.
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
        backoff_factor: 2.0,
    }
}

/// A web search tool call.
pub fn search_call(id: &str, query: &str) -> ToolInvocation {
    ToolInvocation {
        id: id.to_string(),
        name: WEB_SEARCH.to_string(),
        arguments: serde_json::json!({ "query": query }).to_string(),
    }
}
