// handlers/protected/mod.rs - Protected handlers (admin token required)
//
// Mutating project routes sit behind `admin_auth_middleware`; `/api/auth/me`
// runs the same guard inline so it can answer with its own 401 message.

pub mod auth;
pub mod projects;
