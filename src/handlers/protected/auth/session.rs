use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::public::auth::UserInfo;
use crate::middleware::authenticate;
use crate::state::AppState;

/// GET /api/auth/me - Current admin identity from the cookie or bearer token
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "user": { "id": "admin", "name": "...", "email": "...", "role": "admin" }
/// }
/// ```
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let claims = authenticate(&headers, &state.tokens, &state.config.admin.email).map_err(|e| {
        tracing::debug!("/api/auth/me rejected: {}", e);
        ApiError::unauthorized("Not authenticated")
    })?;

    Ok(Json(json!({
        "success": true,
        "user": UserInfo::from(claims),
    })))
}
