//! Snakk - a chat backend with web search
//!
//! Relays a tool-calling LLM agent to chat clients, either as a single JSON
//! answer or as a live event stream of tokens and tool progress.
//!
//! The name "Snakk" comes from the Norwegian word for "chat."
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `model` - Chat model abstraction (OpenAI-compatible APIs)
//! - `search` - Web search backends (Tavily)
//! - `agent` - The model/tool loop, its messages and events
//! - `checkpoint` - Per-thread conversation persistence
//! - `retry` - Backoff policy for tool execution
//! - `relay` - Event stream framing
//! - `api` - HTTP endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use snakk::agent::{AgentSession, ChatMessage};
//! use snakk::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let session = AgentSession::from_settings(&settings)?;
//!
//!     let answer = session.invoke(&[ChatMessage::user("What's the weather in Oslo?")]).await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod api;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod openai;
pub mod relay;
pub mod retry;
pub mod search;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, SnakkError};
