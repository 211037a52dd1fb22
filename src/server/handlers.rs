//! Route handlers
//!
//! Handlers are thin: they extract the request, call the chat service and
//! map the outcome to JSON.

use crate::context::{AppContext, HealthStatus};
use crate::server::error::ApiError;
use crate::session::Message;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Body of `POST /chat` and `POST /chat/realtime`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message, 1 to 32000 characters
    pub message: String,
    /// Session to continue; a new one is created when absent
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply of both chat endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply
    pub response: String,
    /// Session the turn was stored under
    pub session_id: String,
}

/// Reply of `GET /chat/history/{session_id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Requested session
    pub session_id: String,
    /// Messages in the order they were stored; empty for an unknown session
    pub messages: Vec<Message>,
}

/// `GET /` - service name and endpoint directory
pub async fn root(State(ctx): State<AppContext>) -> Json<Value> {
    Json(json!({
        "message": format!("{} API", ctx.config.assistant.name),
        "endpoints": {
            "/chat": "General chat (retrieved context, no web search)",
            "/chat/realtime": "Realtime chat (with web search)",
            "/chat/history/{session_id}": "Get chat history",
            "/health": "System health check"
        }
    }))
}

/// `GET /health`
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthStatus> {
    Json(ctx.health())
}

/// `POST /chat`
pub async fn chat(
    State(ctx): State<AppContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let reply = ctx
        .chat
        .chat(request.session_id.as_deref(), &request.message)
        .await?;
    Ok(Json(ChatResponse {
        response: reply.response,
        session_id: reply.session_id,
    }))
}

/// `POST /chat/realtime`
pub async fn chat_realtime(
    State(ctx): State<AppContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let reply = ctx
        .chat
        .chat_realtime(request.session_id.as_deref(), &request.message)
        .await?;
    Ok(Json(ChatResponse {
        response: reply.response,
        session_id: reply.session_id,
    }))
}

/// `GET /chat/history/{session_id}`
pub async fn history(
    State(ctx): State<AppContext>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session = ctx.chat.history(&session_id).await?;
    Ok(Json(HistoryResponse {
        session_id: session.session_id,
        messages: session.messages,
    }))
}
