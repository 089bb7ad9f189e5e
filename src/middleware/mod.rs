pub mod auth;

pub use auth::{admin_auth_middleware, authenticate, extract_token, AuthUser};
