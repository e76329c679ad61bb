//! HTTP API server for chat clients.

use crate::agent::AgentSession;
use crate::api::{self, AppState};
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use std::sync::Arc;
use tracing::info;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let session = Arc::new(AgentSession::from_settings(&settings)?);
    let state = Arc::new(AppState { session });
    let app = api::router(state, &settings.server.allowed_origin)?;

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Listening on {} (model {})", addr, settings.model.name);

    Output::header("Snakk API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Model", &settings.model.name);
    Output::kv("Allowed origin", &settings.server.allowed_origin);
    Output::kv("Checkpoints", &settings.checkpoint.provider.to_string());
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /api/chat");
    Output::kv("Stream", "GET  /api/chat/stream?prompt=...&thread_id=...");
    Output::kv("Reset", "GET  /api/chat/stream/reset?thread_id=...");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
