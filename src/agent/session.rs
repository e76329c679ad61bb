//! Agent session: the model/tool loop behind every chat request.

use super::events::{AgentEvent, EventSink, Node};
use super::message::{adapt_messages, ChatMessage, Message, ToolInvocation};
use super::notifier::ToolCallNotifier;
use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::checkpoint::{self, ThreadStore};
use crate::config::{Settings, DEFAULT_SYSTEM_PROMPT};
use crate::error::{Result, SnakkError};
use crate::model::{ChatModel, ModelChunk, ModelTurn, OpenAIChatModel, ToolSpec, TurnAccumulator};
use crate::retry::RetryPolicy;
use crate::search::TavilySearch;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, instrument, warn};

/// Default cap on model calls per request.
const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Where a request is in the model/tool loop.
#[derive(Debug)]
enum LoopState {
    /// Waiting on the model to answer or pick tools.
    Planning { iteration: usize },
    /// Running the tools the model asked for.
    ToolExecuting {
        iteration: usize,
        calls: Vec<ToolInvocation>,
    },
    Answered(String),
    /// The iteration budget ran out before an answer.
    Exhausted,
}

/// How a run ended without error.
#[derive(Debug, PartialEq)]
enum Outcome {
    Answered(String),
    /// The stream consumer went away mid-run.
    Disconnected,
}

/// A model bound to tools, a retry policy, a system prompt and a thread store.
pub struct AgentSession {
    model: Arc<dyn ChatModel>,
    tools: ToolContext,
    tool_specs: Vec<ToolSpec>,
    retry: RetryPolicy,
    system_prompt: String,
    max_iterations: usize,
    threads: Arc<dyn ThreadStore>,
}

impl AgentSession {
    /// Create a new session with default prompt, retry policy and limits.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolContext, threads: Arc<dyn ThreadStore>) -> Self {
        Self {
            model,
            tools,
            tool_specs: tool_definitions(),
            retry: RetryPolicy::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            threads,
        }
    }

    /// Build a session wired to the configured model, search API and store.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let model = Arc::new(OpenAIChatModel::from_settings(&settings.model)?);
        let search = Arc::new(TavilySearch::from_settings(&settings.search)?);
        let tools = ToolContext::new(search, settings.search.max_results);
        let threads = checkpoint::open(settings)?;

        Ok(Self::new(model, tools, threads)
            .with_system_prompt(&settings.agent.system_prompt)
            .with_max_iterations(settings.agent.max_iterations)
            .with_retry_policy(RetryPolicy::from(&settings.retry)))
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum model calls per request.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the retry policy for tool execution.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run a conversation to completion and return the final answer text.
    ///
    /// Stateless: nothing is loaded from or saved to the thread store.
    #[instrument(skip_all, fields(messages = request.len()))]
    pub async fn invoke(&self, request: &[ChatMessage]) -> Result<String> {
        let mut messages = self.conversation(Vec::new(), request);

        match self.run(&mut messages, &EventSink::Discard, false).await? {
            Outcome::Answered(text) => Ok(text),
            Outcome::Disconnected => Err(SnakkError::Agent("Run ended without an answer".to_string())),
        }
    }

    /// Run a conversation and stream its events.
    ///
    /// The loop runs on its own task and hands over one event at a time.
    /// Dropping the returned stream stops the loop at its next event. A run
    /// error arrives as the last item. With a thread id, prior turns are
    /// loaded first and the extended history is saved once answered.
    pub fn stream(
        self: &Arc<Self>,
        request: Vec<ChatMessage>,
        thread_id: Option<String>,
    ) -> ReceiverStream<Result<AgentEvent>> {
        let (tx, rx) = mpsc::channel(1);
        let session = Arc::clone(self);

        tokio::spawn(async move {
            let sink = EventSink::Channel(tx.clone());
            if let Err(e) = session.run_thread(&request, thread_id.as_deref(), &sink).await {
                warn!("Agent stream failed: {}", e);
                let _ = tx.send(Err(e)).await;
            }
        });

        ReceiverStream::new(rx)
    }

    /// Forget a thread, or every thread when no id is given.
    pub async fn reset(&self, thread_id: Option<&str>) -> Result<()> {
        match thread_id {
            Some(id) => {
                let existed = self.threads.delete(id).await?;
                info!("Reset thread {} (existed: {})", id, existed);
            }
            None => {
                let count = self.threads.clear().await?;
                info!("Reset all threads ({} removed)", count);
            }
        }
        Ok(())
    }

    /// Ids of all threads with stored history.
    pub async fn thread_ids(&self) -> Result<Vec<String>> {
        self.threads.thread_ids().await
    }

    async fn run_thread(
        &self,
        request: &[ChatMessage],
        thread_id: Option<&str>,
        sink: &EventSink,
    ) -> Result<()> {
        let history = match thread_id {
            Some(id) => self.threads.load(id).await?,
            None => Vec::new(),
        };
        let mut messages = self.conversation(history, request);

        match self.run(&mut messages, sink, true).await? {
            Outcome::Answered(_) => {
                if let Some(id) = thread_id {
                    self.threads.save(id, &messages[1..]).await?;
                }
            }
            Outcome::Disconnected => debug!("Stream consumer disconnected, run abandoned"),
        }
        Ok(())
    }

    /// System prompt, then stored history, then the new request.
    fn conversation(&self, history: Vec<Message>, request: &[ChatMessage]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(1 + history.len() + request.len());
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend(history);
        messages.extend(adapt_messages(request));
        messages
    }

    /// Drive the loop until the model answers, the budget runs out, or the
    /// consumer disconnects. Every turn is appended to `messages`.
    async fn run(&self, messages: &mut Vec<Message>, sink: &EventSink, streaming: bool) -> Result<Outcome> {
        let mut state = LoopState::Planning { iteration: 1 };

        loop {
            state = match state {
                LoopState::Planning { iteration } if iteration > self.max_iterations => {
                    LoopState::Exhausted
                }
                LoopState::Planning { iteration } => {
                    debug!("Agent iteration {}", iteration);

                    let turn = if streaming {
                        match self.plan_streaming(messages, sink).await? {
                            Some(turn) => turn,
                            None => return Ok(Outcome::Disconnected),
                        }
                    } else {
                        self.model.complete(messages, &self.tool_specs).await?
                    };

                    messages.push(Message::Assistant {
                        content: turn.content.clone(),
                        tool_calls: turn.tool_calls.clone(),
                    });

                    if turn.tool_calls.is_empty() {
                        LoopState::Answered(turn.content.unwrap_or_default())
                    } else {
                        LoopState::ToolExecuting {
                            iteration,
                            calls: turn.tool_calls,
                        }
                    }
                }
                LoopState::ToolExecuting { iteration, calls } => {
                    if sink.is_closed() {
                        return Ok(Outcome::Disconnected);
                    }
                    for call in &calls {
                        let result = self.execute_tool_call(call, sink).await?;
                        messages.push(Message::tool_result(call.id.clone(), result.clone()));

                        let delivered = sink
                            .emit(AgentEvent::ModelToken {
                                text: result,
                                node: Node::Tools,
                            })
                            .await;
                        if !delivered {
                            return Ok(Outcome::Disconnected);
                        }
                    }
                    LoopState::Planning {
                        iteration: iteration + 1,
                    }
                }
                LoopState::Answered(text) => return Ok(Outcome::Answered(text)),
                LoopState::Exhausted => {
                    warn!("Agent exceeded maximum iterations ({})", self.max_iterations);
                    return Err(SnakkError::IterationLimit(self.max_iterations));
                }
            };
        }
    }

    /// Stream one model turn, forwarding text fragments as they arrive.
    /// Returns None if the consumer disconnected.
    async fn plan_streaming(&self, messages: &[Message], sink: &EventSink) -> Result<Option<ModelTurn>> {
        let mut chunks = self.model.stream(messages, &self.tool_specs).await?;
        let mut turn = TurnAccumulator::default();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if let ModelChunk::Token(text) = &chunk {
                if !sink.emit(AgentEvent::token(text.clone())).await {
                    return Ok(None);
                }
            }
            turn.push(chunk);
        }

        Ok(Some(turn.finish()))
    }

    /// Announce and run one tool call.
    ///
    /// Malformed calls are reported back to the model as the tool result.
    /// Execution failures are retried, then propagated.
    async fn execute_tool_call(&self, call: &ToolInvocation, sink: &EventSink) -> Result<String> {
        info!("Agent calling tool: {}", call);

        let notifier = ToolCallNotifier::new(sink.clone());
        notifier
            .intercept(call, || async {
                match parse_tool_call(&call.name, &call.arguments) {
                    Ok(tool) => self.retry.execute(|| self.tools.execute(&tool)).await,
                    Err(e) => Ok(format!("Failed to parse tool call: {}", e)),
                }
            })
            .await
    }
}
