// handlers/mod.rs - Handler tiers
//
// Public (no auth) and Protected (admin token) handlers, plus the
// unauthenticated system endpoints.

pub mod protected; // POST/PUT/DELETE /api/projects, GET /api/auth/me
pub mod public; // /api/auth/login, /api/projects, /api/upload, /api/chat
pub mod system; // GET /, GET /health
