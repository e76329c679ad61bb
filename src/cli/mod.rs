//! CLI module for Snakk.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::CheckpointProvider;
use clap::{Parser, Subcommand};

/// Snakk - a chat backend with web search
///
/// Serves a tool-calling LLM agent over HTTP, or talks to it from the terminal.
/// The name "Snakk" comes from the Norwegian word for "chat."
#[derive(Parser, Debug)]
#[command(name = "snakk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP chat server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Thread store backend, memory or sqlite (defaults to checkpoint.provider)
        #[arg(long)]
        checkpoint: Option<CheckpointProvider>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The prompt to send
        prompt: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive, streaming chat session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Conversation thread to resume (a new one is started if omitted)
        #[arg(short, long)]
        thread: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write a default configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_with_thread() {
        let cli = Cli::try_parse_from(["snakk", "-v", "chat", "--thread", "t1"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Chat { thread, model } => {
                assert_eq!(thread.as_deref(), Some("t1"));
                assert!(model.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["snakk", "serve", "--port", "9000", "--checkpoint", "sqlite"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Serve {
                host: None,
                port: Some(9000),
                checkpoint: Some(CheckpointProvider::Sqlite),
            }
        ));
    }
}
