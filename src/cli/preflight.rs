//! Pre-flight checks before talking to the model.
//!
//! Validates that required API keys are available before starting
//! operations that would otherwise fail on the first request.

use crate::config::Settings;
use crate::error::{Result, SnakkError};

/// Run pre-flight checks for commands that run the agent.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings) -> Result<()> {
    check_model_key(settings)?;
    check_search_key(settings)?;
    Ok(())
}

/// A custom endpoint (e.g. a local model) may not need a key at all.
fn check_model_key(settings: &Settings) -> Result<()> {
    if settings.model.api_key.is_some() || settings.model.base_url.is_some() {
        return Ok(());
    }
    check_env("OPENAI_API_KEY", "sk-...")
}

fn check_search_key(settings: &Settings) -> Result<()> {
    if settings.search.api_key.is_some() {
        return Ok(());
    }
    check_env("TAVILY_API_KEY", "tvly-...")
}

fn check_env(name: &str, example: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(SnakkError::Config(format!(
            "{} is empty. Set it with: export {}='{}'",
            name, name, example
        ))),
        Err(_) => Err(SnakkError::Config(format!(
            "{} not set. Set it with: export {}='{}'",
            name, name, example
        ))),
    }
}
