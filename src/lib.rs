pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::{DatabaseManager, MemoryProjectStore, PgProjectStore, ProjectStore};
use crate::middleware::admin_auth_middleware;
use crate::services::{ChatProxy, DeveloperProfile};
use crate::state::AppState;

/// Full application router over `state`
pub fn app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let router = Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(public_routes())
        // Admin-only
        .merge(protected_routes(&state))
        // Uploaded images, served as static files
        .nest_service(
            &config.upload.public_prefix,
            ServeDir::new(&config.upload.dir),
        )
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    let router = match cors_layer(&config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{auth, chat, projects, upload};

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/projects", get(projects::list))
        .route("/api/upload", post(upload::upload))
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/status", get(chat::status))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected::{auth, projects};

    Router::new()
        .route("/api/projects", post(projects::create))
        .route("/api/projects/:id", put(projects::update).delete(projects::delete))
        .route_layer(from_fn_with_state(state.clone(), admin_auth_middleware))
        // Checks the token itself so it can answer with its own message
        .route("/api/auth/me", get(auth::me))
}

/// Credentialed CORS for the configured origins; `None` when no origin is configured.
fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    )
}

/// Postgres store when `DATABASE_URL` is set, otherwise the in-memory store.
///
/// The returned manager owns the pool so the caller can close it on shutdown.
pub async fn open_project_store(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn ProjectStore>, Option<DatabaseManager>)> {
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL not set; projects are kept in memory and lost on restart");
        return Ok((Arc::new(MemoryProjectStore::new()), None));
    }

    let database = DatabaseManager::connect(&config.database).await?;
    let store = PgProjectStore::new(database.pool().clone());
    store.ensure_schema().await?;

    Ok((Arc::new(store), Some(database)))
}

/// Chat proxy with the built-in profile, or the one at `CHAT_PROFILE_PATH`.
pub fn build_chat_proxy(config: &AppConfig) -> anyhow::Result<ChatProxy> {
    let profile = match &config.chat.profile_path {
        Some(path) => {
            let profile = DeveloperProfile::from_yaml_file(path)?;
            tracing::info!("Loaded chat profile for {} from {}", profile.name, path.display());
            profile
        }
        None => DeveloperProfile::default(),
    };

    if config.chat.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; chat will answer with the fallback reply");
    }

    Ok(ChatProxy::new(&config.chat, profile)?)
}
