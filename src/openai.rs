//! OpenAI client configuration with sensible defaults.

use crate::config::ModelSettings;
use crate::error::{Result, SnakkError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the endpoint described by the model settings.
///
/// Works for any OpenAI-compatible server (Ollama, LM Studio, vLLM) when
/// `base_url` is set.
pub fn create_client_for(settings: &ModelSettings) -> Result<Client<OpenAIConfig>> {
    let mut config = OpenAIConfig::default();
    if let Some(base_url) = &settings.base_url {
        config = config.with_api_base(base_url.trim_end_matches('/'));
    }
    if let Some(api_key) = &settings.api_key {
        config = config.with_api_key(api_key);
    }

    create_client_with_timeout(config, Duration::from_secs(settings.timeout_secs))
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(
    config: OpenAIConfig,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SnakkError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
