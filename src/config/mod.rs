//! Configuration module for Snakk.
//!
//! Handles loading and validating application settings.

mod settings;

pub use settings::{
    AgentSettings, CheckpointProvider, CheckpointSettings, GeneralSettings, ModelSettings,
    RetrySettings, SearchSettings, ServerSettings, Settings, DEFAULT_SYSTEM_PROMPT,
};
