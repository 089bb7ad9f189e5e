use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Option<Vec<ChatMessage>>,
}

impl ChatRequest {
    /// Only the latest message is forwarded; earlier turns are dropped.
    fn latest(&self) -> Option<&ChatMessage> {
        self.messages.as_ref()?.last()
    }
}

/// POST /api/chat - Ask the portfolio assistant a question
///
/// Expected Input:
/// ```json
/// { "messages": [{ "role": "user", "content": "What do you build?" }] }
/// ```
///
/// Expected Output: `{ "text": "..." }`. When the upstream model fails the
/// status is 500 and the body is `{ "error": "...", "text": "<fallback>" }`.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::bad_request("Messages array is required"))?;
    let message = request
        .latest()
        .ok_or_else(|| ApiError::bad_request("Messages array is required"))?;

    tracing::debug!("Chat request ({} role, {} chars)", message.role, message.content.len());

    let reply = state.chat.respond(&message.content).await;
    if reply.is_fallback {
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Failed to generate response",
                "text": reply.text,
            })),
        )
            .into_response());
    }

    Ok(Json(json!({ "text": reply.text })).into_response())
}

/// GET /api/chat/status - Last known reachability of the chat upstream
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "online": state.chat.is_online() }))
}
