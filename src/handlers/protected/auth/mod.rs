pub mod session; // GET /api/auth/me

pub use session::me;
