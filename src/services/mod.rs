pub mod chat_service;
pub mod profile;
pub mod upload_service;

pub use chat_service::{ChatError, ChatProxy, ChatReply, FALLBACK_REPLY};
pub use profile::DeveloperProfile;
pub use upload_service::{UploadError, UploadFile, UploadHandler, UploadedAsset};
