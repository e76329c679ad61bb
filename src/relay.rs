//! Server-sent-event framing for agent event streams.
//!
//! Model text goes out as `data: <text>` frames, tool progress as
//! `tool: <text>` frames, and every stream ends with `data: [DONE]`.

use crate::agent::{AgentEvent, Node};
use crate::error::Result;
use futures::stream::{self, Stream, StreamExt};
use tracing::error;

/// Final frame of every relayed stream.
pub const DONE_SENTINEL: &str = "data: [DONE]\n\n";

/// Render one event as a frame, or None if the client never sees it.
///
/// Empty text fragments and output from the tool node are dropped.
pub fn frame(event: &AgentEvent) -> Option<String> {
    match event {
        AgentEvent::ModelToken {
            text,
            node: Node::Model,
        } if !text.is_empty() => Some(field_lines("data", text)),
        AgentEvent::ModelToken { .. } => None,
        AgentEvent::ToolNotification { text } => Some(field_lines("tool", text)),
    }
}

/// One `<field>: ` line per line of `text`, then the blank line that ends
/// the frame. Clients rejoin consecutive lines with `\n`.
fn field_lines(field: &str, text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(text.len() + field.len() + 4);
    for line in text.split('\n') {
        out.push_str(field);
        out.push_str(": ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out
}

/// Turn an agent event stream into frames.
///
/// An error ends the stream early; it is logged and the client still gets
/// the closing sentinel.
pub fn relay<S>(events: S) -> impl Stream<Item = String> + Send
where
    S: Stream<Item = Result<AgentEvent>> + Send + 'static,
{
    events
        .take_while(|event| {
            let keep = match event {
                Ok(_) => true,
                Err(e) => {
                    error!("Streaming error: {}", e);
                    false
                }
            };
            futures::future::ready(keep)
        })
        .filter_map(|event| futures::future::ready(event.ok().and_then(|e| frame(&e))))
        .chain(stream::once(futures::future::ready(DONE_SENTINEL.to_string())))
}
