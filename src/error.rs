//! Error types for Snakk.

use thiserror::Error;

/// Library-level error type for Snakk operations.
#[derive(Error, Debug)]
pub enum SnakkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Tool failed: {0}")]
    ToolFailed(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Agent exceeded maximum iterations ({0})")]
    IterationLimit(usize),
}

impl SnakkError {
    /// Whether a failed tool execution is worth retrying.
    ///
    /// Transport and backend failures are; malformed input and local
    /// bookkeeping errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SnakkError::Http(_) | SnakkError::Search(_) | SnakkError::ToolFailed(_) | SnakkError::Io(_)
        )
    }
}

/// Result type alias for Snakk operations.
pub type Result<T> = std::result::Result<T, SnakkError>;
