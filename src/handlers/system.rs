use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET / - Service banner and endpoint map
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Folio API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/auth/login, /api/auth/logout (public), /api/auth/me (token)",
            "projects": "GET /api/projects (public), POST/PUT/DELETE /api/projects[/:id] (admin)",
            "upload": "POST /api/upload (public, multipart field 'image')",
            "uploads": "/uploads/:name (public, static files)",
            "chat": "POST /api/chat, GET /api/chat/status (public)",
        }
    }))
}

/// GET /health - Store reachability plus the chat online flag
///
/// Answers 503 when the project store cannot be reached.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.projects.backend();
    let (status, database) = match state.projects.health_check().await {
        Ok(()) => (StatusCode::OK, "connected"),
        Err(e) => {
            tracing::error!("Health check failed for {} store: {}", backend, e);
            (StatusCode::SERVICE_UNAVAILABLE, "disconnected")
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "ok" } else { "degraded" },
            "timestamp": chrono::Utc::now(),
            "database": { "backend": backend, "status": database },
            "chat": { "online": state.chat.is_online() },
        })),
    )
}
