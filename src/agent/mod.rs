//! Chat agent with tool calling.
//!
//! Provides a model-driven agent that can search the web before answering,
//! either in one shot or as a stream of tokens and tool notifications.

mod events;
mod message;
mod notifier;
mod session;
mod tools;

pub use events::{AgentEvent, EventSink, Node};
pub use message::{adapt_messages, ChatMessage, Message, ToolInvocation};
pub use notifier::{notification_text, ToolCallNotifier};
pub use session::AgentSession;
pub use tools::{display_name, parse_tool_call, tool_definitions, ToolCall, ToolContext, WEB_SEARCH};
