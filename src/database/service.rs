use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::user::{User, MIN_PASSWORD_LEN};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,

    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

pub async fn ensure_user_schema(pool: &PgPool) -> Result<(), UserError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            UUID PRIMARY KEY,
            name          TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role          TEXT NOT NULL DEFAULT 'admin' CHECK (role IN ('admin', 'user')),
            created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Find the first admin user, if one was ever seeded
pub async fn find_admin(pool: &PgPool) -> Result<Option<User>, UserError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, created_at
         FROM users
         WHERE role = 'admin'
         ORDER BY created_at
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Insert an admin user with an argon2-hashed password.
pub async fn create_admin(pool: &PgPool, name: &str, email: &str, password: &str) -> Result<User, UserError> {
    if name.trim().is_empty() {
        return Err(UserError::MissingField("name"));
    }
    if email.trim().is_empty() {
        return Err(UserError::MissingField("email"));
    }
    let password_hash = hash_password(password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, name, email, password_hash, role)
         VALUES ($1, $2, $3, $4, 'admin')
         RETURNING id, name, email, password_hash, role, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(name.trim())
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub fn hash_password(password: &str) -> Result<String, UserError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(UserError::PasswordTooShort);
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}
