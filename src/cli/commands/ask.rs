//! Ask command implementation.

use crate::agent::{AgentSession, ChatMessage};
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(prompt: &str, model: Option<String>, mut settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.model.name = model;
    }

    let session = AgentSession::from_settings(&settings)?;

    let spinner = Output::spinner("Thinking...");

    match session.invoke(&[ChatMessage::user(prompt)]).await {
        Ok(answer) => {
            spinner.finish_and_clear();
            println!("\n{}\n", answer);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
