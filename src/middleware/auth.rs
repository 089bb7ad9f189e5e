use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Claims, TokenService};
use crate::error::ApiError;
use crate::state::AppState;

pub const TOKEN_COOKIE: &str = "token";

/// Authenticated admin context extracted from a verified token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Token from the `token` cookie, falling back to `Authorization: Bearer`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie_token(headers).or_else(|| extract_bearer_token(headers))
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Verify the request's token and check it belongs to the configured admin.
pub fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenService,
    admin_email: &str,
) -> Result<Claims, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::Unauthenticated("no token provided"))?;

    let claims = tokens.verify(&token).map_err(|e| match e {
        AuthError::InvalidToken => AuthError::Unauthenticated("invalid token"),
        other => other,
    })?;

    // Tokens signed for anyone else (old secret, other admin) are refused
    if admin_email.is_empty() || claims.email != admin_email {
        return Err(AuthError::Unauthenticated("token identity mismatch"));
    }

    Ok(claims)
}

/// Guards mutating routes; injects `AuthUser` into request extensions.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(request.headers(), &state.tokens, &state.config.admin.email)
        .map_err(|e| {
            tracing::warn!(
                "Rejected {} {}: {}",
                request.method(),
                request.uri().path(),
                e
            );
            ApiError::from(e)
        })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// `Set-Cookie` value carrying a freshly issued token
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        TOKEN_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that makes the browser drop the token
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}
