// handlers/public/mod.rs - Public handlers (no authentication)
//
// Token acquisition, read-only project listing, image upload and the chat proxy.

pub mod auth;
pub mod chat;
pub mod projects;
pub mod upload;
