//! Chat completion models the agent can drive.
//!
//! The agent talks to models through the [`ChatModel`] trait so the loop can
//! be exercised without a network.

mod openai;

pub use openai::OpenAIChatModel;

use crate::agent::{Message, ToolInvocation};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::collections::BTreeMap;

/// Description of a tool offered to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// One complete model response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    /// Answer text, if any.
    pub content: Option<String>,
    /// Tools the model wants to run before answering.
    pub tool_calls: Vec<ToolInvocation>,
}

impl ModelTurn {
    /// A turn that answers directly.
    pub fn answer(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A turn that only requests tool calls.
    pub fn tool_calls(calls: Vec<ToolInvocation>) -> Self {
        Self {
            content: None,
            tool_calls: calls,
        }
    }
}

/// An incremental piece of a streamed model response.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelChunk {
    /// A fragment of answer text. May be empty.
    Token(String),
    /// A fragment of a tool call. Fragments sharing an index belong to the
    /// same call; `id` and `name` usually arrive only on the first one.
    ToolCall {
        index: u32,
        id: Option<String>,
        name: Option<String>,
        arguments: String,
    },
}

/// Stream of chunks for a single model response.
pub type ModelStream = BoxStream<'static, Result<ModelChunk>>;

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produce a complete response for the conversation.
    async fn complete(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelTurn>;

    /// Produce a response incrementally.
    async fn stream(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<ModelStream>;
}

/// Folds streamed chunks back into a [`ModelTurn`].
#[derive(Debug, Default)]
pub struct TurnAccumulator {
    content: String,
    calls: BTreeMap<u32, ToolInvocation>,
}

impl TurnAccumulator {
    pub fn push(&mut self, chunk: ModelChunk) {
        match chunk {
            ModelChunk::Token(text) => self.content.push_str(&text),
            ModelChunk::ToolCall {
                index,
                id,
                name,
                arguments,
            } => {
                let call = self.calls.entry(index).or_insert_with(|| ToolInvocation {
                    id: String::new(),
                    name: String::new(),
                    arguments: String::new(),
                });
                if let Some(id) = id {
                    call.id = id;
                }
                if let Some(name) = name {
                    call.name.push_str(&name);
                }
                call.arguments.push_str(&arguments);
            }
        }
    }

    pub fn finish(self) -> ModelTurn {
        ModelTurn {
            content: Some(self.content).filter(|c| !c.is_empty()),
            tool_calls: self.calls.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_joins_tokens() {
        let mut acc = TurnAccumulator::default();
        acc.push(ModelChunk::Token(String::new()));
        acc.push(ModelChunk::Token("The answer".to_string()));
        acc.push(ModelChunk::Token(" is 4".to_string()));

        assert_eq!(acc.finish(), ModelTurn::answer("The answer is 4"));
    }

    #[test]
    fn test_accumulator_assembles_interleaved_tool_calls() {
        let mut acc = TurnAccumulator::default();
        acc.push(ModelChunk::ToolCall {
            index: 1,
            id: Some("call_b".to_string()),
            name: Some("web_search".to_string()),
            arguments: r#"{"query":"#.to_string(),
        });
        acc.push(ModelChunk::ToolCall {
            index: 0,
            id: Some("call_a".to_string()),
            name: Some("web_search".to_string()),
            arguments: r#"{"query":"paris"}"#.to_string(),
        });
        acc.push(ModelChunk::ToolCall {
            index: 1,
            id: None,
            name: None,
            arguments: r#""oslo"}"#.to_string(),
        });

        let turn = acc.finish();
        assert!(turn.content.is_none());
        assert_eq!(turn.tool_calls.len(), 2);
        assert_eq!(turn.tool_calls[0].id, "call_a");
        assert_eq!(turn.tool_calls[1].id, "call_b");
        assert_eq!(turn.tool_calls[1].arguments, r#"{"query":"oslo"}"#);
    }

    #[test]
    fn test_accumulator_empty_tokens_are_no_content() {
        let mut acc = TurnAccumulator::default();
        acc.push(ModelChunk::Token(String::new()));
        assert_eq!(acc.finish(), ModelTurn::default());
    }
}
