//! Progress notifications around tool execution.

use super::events::{AgentEvent, EventSink};
use super::message::ToolInvocation;
use super::tools::display_name;
use crate::error::Result;
use std::future::Future;

/// Wraps tool execution and announces each call on the event sink.
///
/// The wrapper never gates or alters the call: the notification goes out,
/// then the execution runs and its result or error is returned untouched.
#[derive(Debug, Clone)]
pub struct ToolCallNotifier {
    sink: EventSink,
}

impl ToolCallNotifier {
    pub fn new(sink: EventSink) -> Self {
        Self { sink }
    }

    /// Announce `call`, then run `execute`.
    pub async fn intercept<F, Fut>(&self, call: &ToolInvocation, execute: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        self.sink
            .emit(AgentEvent::notification(notification_text(&call.name)))
            .await;
        execute().await
    }
}

/// Text of the notification shown before a tool runs.
pub fn notification_text(tool_name: &str) -> String {
    format!("Running {}...", display_name(tool_name))
}
