pub mod manager;
pub mod memory;
pub mod models;
pub mod project_store;
pub mod service;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProjectStore;
pub use project_store::PgProjectStore;
pub use store::{ProjectStore, StoreError};
