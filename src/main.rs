use anyhow::Context;
use tracing_subscriber::EnvFilter;

use folio_api::config::AppConfig;
use folio_api::state::AppState;
use folio_api::{app, build_chat_proxy, open_project_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_EMAIL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("folio_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Folio API in {:?} mode", config.environment);
    tracing::debug!("Configuration: {:?}", config);

    if !config.admin.is_configured() {
        tracing::warn!("ADMIN_EMAIL / ADMIN_PASSWORD not set; login is disabled");
    }

    let (projects, database) = open_project_store(&config).await?;
    tracing::info!("Using {} project store", projects.backend());

    let chat = build_chat_proxy(&config)?;
    let port = config.api.port;
    let state = AppState::new(config, projects, chat);
    let probe = state.chat.spawn_health_probe();

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Folio API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    probe.abort();
    if let Some(database) = database {
        database.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
