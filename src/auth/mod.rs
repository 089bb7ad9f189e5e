use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AdminConfig, SecurityConfig};

pub const ADMIN_ID: &str = "admin";
pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by every admin token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Not authorized: {0}")]
    Unauthenticated(&'static str),
}

/// Login input, checked against the configured administrator
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn matches(&self, admin: &AdminConfig) -> bool {
        admin.is_configured() && self.email == admin.email && self.password == admin.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Issues and verifies HS256 tokens for the single admin identity.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    secret_configured: bool,
    expiry: Duration,
    admin_name: String,
    admin_email: String,
}

impl TokenService {
    pub fn new(security: &SecurityConfig, admin: &AdminConfig) -> Self {
        let secret = security.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            secret_configured: !secret.is_empty(),
            expiry: Duration::days(security.jwt_expiry_days),
            admin_name: admin.name.clone(),
            admin_email: admin.email.clone(),
        }
    }

    /// Lifetime of issued tokens, also used as the cookie max-age
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn admin_claims(&self) -> Claims {
        let now = Utc::now();
        Claims {
            id: ADMIN_ID.to_string(),
            name: self.admin_name.clone(),
            email: self.admin_email.clone(),
            role: ADMIN_ROLE.to_string(),
            exp: (now + self.expiry).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn issue(&self) -> Result<String, AuthError> {
        self.issue_claims(&self.admin_claims())
    }

    pub fn issue_claims(&self, claims: &Claims) -> Result<String, AuthError> {
        if !self.secret_configured {
            return Err(AuthError::MissingSecret);
        }

        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Checks signature and expiry. Every failure collapses to `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if !self.secret_configured {
            return Err(AuthError::MissingSecret);
        }

        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("token rejected: {}", e);
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_secret(secret: &str) -> TokenService {
        let security = SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_expiry_days: 30,
            secure_cookies: false,
            cors_origins: vec![],
        };
        let admin = AdminConfig {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "correct horse".to_string(),
        };
        TokenService::new(&security, &admin)
    }

    #[test]
    fn issued_token_round_trips_admin_identity() {
        let tokens = service_with_secret("test-secret-that-is-long-enough-for-hmac");
        let token = tokens.issue().expect("token generation should succeed");

        let claims = tokens.verify(&token).expect("token validation should succeed");
        assert_eq!(claims.id, ADMIN_ID);
        assert_eq!(claims.role, ADMIN_ROLE);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.name, "Ada");
        // Thirty days, give or take the second boundary
        assert!((claims.exp - claims.iat - 30 * 24 * 60 * 60).abs() <= 1);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service_with_secret("test-secret");
        let now = Utc::now().timestamp();
        let mut claims = tokens.admin_claims();
        claims.iat = now - 600;
        claims.exp = now - 300; // well past the default leeway

        let token = tokens.issue_claims(&claims).unwrap();
        assert_eq!(tokens.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let tokens = service_with_secret("test-secret");
        let token = tokens.issue().unwrap();

        let (body, signature) = token.rsplit_once('.').unwrap();
        let flipped: String = signature
            .chars()
            .rev()
            .collect();
        let tampered = format!("{}.{}", body, flipped);

        assert_eq!(tokens.verify(&tampered), Err(AuthError::InvalidToken));
        assert_eq!(tokens.verify("not-a-token"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn different_secrets_fail() {
        let alpha = service_with_secret("secret-alpha");
        let bravo = service_with_secret("secret-bravo");

        let token = alpha.issue().unwrap();
        assert_eq!(bravo.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn empty_secret_cannot_issue() {
        let tokens = service_with_secret("");
        assert_eq!(tokens.issue(), Err(AuthError::MissingSecret));
    }

    #[test]
    fn credentials_match_only_the_configured_admin() {
        let admin = AdminConfig {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
        };
        let good = Credentials { email: "ada@example.com".into(), password: "pw".into() };
        let bad = Credentials { email: "ada@example.com".into(), password: "nope".into() };
        assert!(good.matches(&admin));
        assert!(!bad.matches(&admin));

        let unconfigured = AdminConfig { name: String::new(), email: String::new(), password: String::new() };
        let empty = Credentials { email: String::new(), password: String::new() };
        assert!(!empty.matches(&unconfigured));
    }
}
