//! Events produced by a streaming agent run.

use serde::Serialize;
use tokio::sync::mpsc;

/// Graph node an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// The model generation step.
    Model,
    /// The tool execution step.
    Tools,
}

/// A single event in an agent stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A fragment of output tagged with the node that produced it.
    ModelToken { text: String, node: Node },
    /// Progress notice emitted before a tool runs.
    ToolNotification { text: String },
}

impl AgentEvent {
    pub fn token(text: impl Into<String>) -> Self {
        AgentEvent::ModelToken {
            text: text.into(),
            node: Node::Model,
        }
    }

    pub fn notification(text: impl Into<String>) -> Self {
        AgentEvent::ToolNotification { text: text.into() }
    }
}

/// Where a run sends its events.
///
/// `Discard` is used by non-streaming invocations. A channel sink reports
/// `false` once the receiving side has gone away.
#[derive(Debug, Clone)]
pub enum EventSink {
    Discard,
    Channel(mpsc::Sender<crate::Result<AgentEvent>>),
}

impl EventSink {
    /// Deliver an event. Returns false if the consumer has disconnected.
    pub async fn emit(&self, event: AgentEvent) -> bool {
        match self {
            EventSink::Discard => true,
            EventSink::Channel(tx) => tx.send(Ok(event)).await.is_ok(),
        }
    }

    /// Whether the consumer has disconnected.
    pub fn is_closed(&self) -> bool {
        match self {
            EventSink::Discard => false,
            EventSink::Channel(tx) => tx.is_closed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_reports_disconnect() {
        let (tx, rx) = mpsc::channel(1);
        let sink = EventSink::Channel(tx);

        assert!(!sink.is_closed());
        drop(rx);
        assert!(sink.is_closed());
        assert!(!sink.emit(AgentEvent::token("late")).await);
    }

    #[tokio::test]
    async fn test_discard_sink_accepts_everything() {
        let sink = EventSink::Discard;
        assert!(sink.emit(AgentEvent::notification("x")).await);
        assert!(!sink.is_closed());
    }
}
