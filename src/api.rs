//! HTTP API for chat clients.
//!
//! Provides a one-shot chat endpoint, a streaming endpoint that relays agent
//! events as server-sent frames, and a thread reset endpoint.

use crate::agent::{AgentSession, ChatMessage};
use crate::error::{Result, SnakkError};
use crate::relay::relay;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared application state.
pub struct AppState {
    pub session: Arc<AgentSession>,
}

/// Build the API router, permitting cross-origin requests from one origin.
pub fn router(state: Arc<AppState>, allowed_origin: &str) -> Result<Router> {
    let origin = allowed_origin
        .parse::<HeaderValue>()
        .map_err(|e| SnakkError::Config(format!("Invalid allowed origin '{}': {}", allowed_origin, e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/chat/stream", get(chat_stream))
        .route("/api/chat/stream/reset", get(reset))
        .layer(cors)
        .with_state(state))
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatResponse {
    success: bool,
    message: String,
}

#[derive(Deserialize)]
struct StreamQuery {
    prompt: String,
    #[serde(default = "default_thread_id")]
    thread_id: String,
}

fn default_thread_id() -> String {
    "default".to_string()
}

#[derive(Deserialize)]
struct ResetQuery {
    thread_id: Option<String>,
}

#[derive(Serialize)]
struct ResetResponse {
    success: bool,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    match state.session.invoke(&req.messages).await {
        Ok(message) => Json(ChatResponse {
            success: true,
            message,
        })
        .into_response(),
        Err(e) => {
            error!("Chat request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn chat_stream(State(state): State<Arc<AppState>>, Query(query): Query<StreamQuery>) -> Response {
    info!("Streaming chat on thread {}", query.thread_id);

    let events = state
        .session
        .stream(vec![ChatMessage::user(query.prompt)], Some(query.thread_id));
    let body = Body::from_stream(relay(events).map(Ok::<_, Infallible>));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

async fn reset(State(state): State<Arc<AppState>>, Query(query): Query<ResetQuery>) -> Response {
    match state.session.reset(query.thread_id.as_deref()).await {
        Ok(()) => Json(ResetResponse { success: true }).into_response(),
        Err(e) => {
            error!("Reset failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
