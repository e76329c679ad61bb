//! Configuration settings for Snakk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub model: ModelSettings,
    pub agent: AgentSettings,
    pub retry: RetrySettings,
    pub search: SearchSettings,
    pub checkpoint: CheckpointSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.snakk".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// The single front-end origin allowed by CORS.
    pub allowed_origin: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origin: "http://localhost:3000".to_string(),
        }
    }
}

/// Chat completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model identifier sent to the completion endpoint.
    pub name: String,
    /// Base URL of an OpenAI-compatible API (e.g. a local Ollama server).
    /// None uses the OpenAI default.
    pub base_url: Option<String>,
    /// API key. None falls back to the OPENAI_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Reasoning effort for reasoning models (low, medium, high).
    pub reasoning_effort: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gpt-5-nano".to_string(),
            base_url: None,
            api_key: None,
            reasoning_effort: None,
            timeout_secs: 300,
        }
    }
}

/// Default system prompt for the agent.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful assistant with access to a web search tool.

Use 'web_search' when a question needs current or online information, and answer directly otherwise.
If a tool keeps failing, do not loop forever: tell the user what went wrong and answer with what you have."#;

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// System instruction prepended to every conversation.
    pub system_prompt: String,
    /// Maximum number of model calls per request.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: 10,
        }
    }
}

/// Tool retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum number of attempts per tool call, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,
    /// Ceiling on the delay between retries, in milliseconds.
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each failure.
    pub backoff_factor: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 60_000,
            backoff_factor: 2.0,
        }
    }
}

/// Web search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Search endpoint (Tavily-compatible).
    pub endpoint: String,
    /// API key. None falls back to the TAVILY_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Default number of results per query.
    pub max_results: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            api_key: None,
            max_results: 5,
            timeout_secs: 30,
        }
    }
}

/// Checkpoint store backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointProvider {
    /// Threads live in process memory and vanish on restart.
    #[default]
    Memory,
    /// Threads are persisted in a SQLite database.
    Sqlite,
}

impl std::str::FromStr for CheckpointProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(CheckpointProvider::Memory),
            "sqlite" => Ok(CheckpointProvider::Sqlite),
            _ => Err(format!("Unknown checkpoint provider: {}", s)),
        }
    }
}

impl std::fmt::Display for CheckpointProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointProvider::Memory => write!(f, "memory"),
            CheckpointProvider::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Conversation checkpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointSettings {
    /// Backend (memory, sqlite).
    pub provider: CheckpointProvider,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            provider: CheckpointProvider::Memory,
            sqlite_path: "~/.snakk/threads.db".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings: Settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would otherwise only fail on first use.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SnakkError;

        if let Some(base_url) = &self.model.base_url {
            url::Url::parse(base_url)
                .map_err(|e| SnakkError::Config(format!("Invalid model.base_url '{}': {}", base_url, e)))?;
        }
        url::Url::parse(&self.search.endpoint).map_err(|e| {
            SnakkError::Config(format!("Invalid search.endpoint '{}': {}", self.search.endpoint, e))
        })?;
        url::Url::parse(&self.server.allowed_origin).map_err(|e| {
            SnakkError::Config(format!(
                "Invalid server.allowed_origin '{}': {}",
                self.server.allowed_origin, e
            ))
        })?;

        if let Some(effort) = &self.model.reasoning_effort {
            if !matches!(effort.to_lowercase().as_str(), "low" | "medium" | "high") {
                return Err(SnakkError::Config(format!(
                    "Invalid model.reasoning_effort '{}' (expected low, medium or high)",
                    effort
                )));
            }
        }
        if self.agent.max_iterations == 0 {
            return Err(SnakkError::Config("agent.max_iterations must be at least 1".to_string()));
        }
        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 1.0 {
            return Err(SnakkError::Config(format!(
                "retry.backoff_factor must be a finite number of at least 1 (got {})",
                self.retry.backoff_factor
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(SnakkError::Config("retry.max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SnakkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snakk")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite checkpoint database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.checkpoint.sqlite_path)
    }
}
