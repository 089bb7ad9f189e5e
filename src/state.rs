use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::ProjectStore;
use crate::services::{ChatProxy, UploadHandler};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; every component sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub projects: Arc<dyn ProjectStore>,
    pub uploads: Arc<UploadHandler>,
    pub chat: Arc<ChatProxy>,
}

impl AppState {
    pub fn new(config: AppConfig, projects: Arc<dyn ProjectStore>, chat: ChatProxy) -> Self {
        let tokens = TokenService::new(&config.security, &config.admin);
        let uploads = UploadHandler::new(&config.upload);
        Self {
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            projects,
            uploads: Arc::new(uploads),
            chat: Arc::new(chat),
        }
    }
}
