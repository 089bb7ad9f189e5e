// handlers/public/auth/mod.rs - Public authentication handlers
//
// Token acquisition endpoints that do not require authentication.

pub mod session; // POST /api/auth/login, POST /api/auth/logout

pub use session::{login, logout, UserInfo};
