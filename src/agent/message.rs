//! Conversation messages and the adapter from wire-format chat messages.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A chat message as sent by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role, normally "user" or "assistant".
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Provider-assigned call id, echoed back with the result.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

impl std::fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// A role-tagged message in the agent's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolInvocation>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// An assistant message carrying only text.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Message::User { .. })
    }

    /// Text content of the message, empty for tool-call-only assistant turns.
    pub fn text(&self) -> &str {
        match self {
            Message::System { content } | Message::User { content } => content,
            Message::Assistant { content, .. } => content.as_deref().unwrap_or_default(),
            Message::Tool { content, .. } => content,
        }
    }
}

/// Convert wire messages into agent messages, preserving order.
///
/// "user" maps to a user message; every other role becomes an assistant
/// message. Roles other than "user" and "assistant" are logged.
pub fn adapt_messages(messages: &[ChatMessage]) -> Vec<Message> {
    messages.iter().map(adapt_message).collect()
}

fn adapt_message(message: &ChatMessage) -> Message {
    match message.role.as_str() {
        "user" => Message::user(message.content.clone()),
        "assistant" => Message::assistant(message.content.clone()),
        other => {
            warn!("Unrecognized message role '{}', treating as assistant", other);
            Message::assistant(message.content.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_preserves_order_and_roles() {
        let input = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage {
                role: "system".to_string(),
                content: "odd".to_string(),
            },
            ChatMessage::user("2+2?"),
        ];

        let output = adapt_messages(&input);

        assert_eq!(output.len(), input.len());
        for (wire, adapted) in input.iter().zip(&output) {
            assert_eq!(adapted.is_user(), wire.role == "user");
            assert_eq!(adapted.text(), wire.content);
        }
    }

    #[test]
    fn test_adapter_empty() {
        assert!(adapt_messages(&[]).is_empty());
    }

    #[test]
    fn test_message_serde_shape() {
        let msg = Message::Assistant {
            content: None,
            tool_calls: vec![ToolInvocation {
                id: "call_1".to_string(),
                name: "web_search".to_string(),
                arguments: r#"{"query":"rust"}"#.to_string(),
            }],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json.get("content").is_none());

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_tool_invocation_display() {
        let call = ToolInvocation {
            id: "1".to_string(),
            name: "web_search".to_string(),
            arguments: r#"{"query": "test"}"#.to_string(),
        };
        assert_eq!(format!("{}", call), r#"web_search({"query": "test"})"#);
    }
}
