use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::auth::{Claims, Credentials};
use crate::error::ApiError;
use crate::middleware::auth::{clear_session_cookie, session_cookie};
use crate::middleware::AuthUser;
use crate::state::AppState;

/// User information returned by login and `/api/auth/me`
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<Claims> for UserInfo {
    fn from(claims: Claims) -> Self {
        AuthUser::from(claims).into()
    }
}

impl From<AuthUser> for UserInfo {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// POST /api/auth/login - Authenticate the administrator and set the token cookie
///
/// Expected Input:
/// ```json
/// { "email": "string", "password": "string" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "user": { "id": "admin", "name": "...", "email": "...", "role": "admin" }
/// }
/// ```
/// plus `Set-Cookie: token=...; HttpOnly; SameSite=Strict; Max-Age=2592000`.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(credentials) = payload?;
    let admin = &state.config.admin;

    if !admin.is_configured() {
        tracing::error!("Login attempted but ADMIN_EMAIL / ADMIN_PASSWORD are not set");
        return Err(ApiError::internal_server_error("Admin credentials not configured"));
    }

    if !credentials.matches(admin) {
        tracing::warn!("Failed login attempt for '{}'", credentials.email);
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let claims = state.tokens.admin_claims();
    let token = state.tokens.issue_claims(&claims)?;
    let cookie = session_cookie(
        &token,
        state.tokens.expiry().num_seconds(),
        state.config.security.secure_cookies,
    );

    tracing::info!("Admin '{}' logged in", claims.email);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "success": true,
            "user": UserInfo::from(claims),
        })),
    )
        .into_response())
}

/// POST /api/auth/logout - Clear the token cookie
///
/// Tokens are not revoked server-side; a copied token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.config.security.secure_cookies),
        )],
        Json(json!({ "success": true })),
    )
}
