//! Coursehub course service

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursehub_server::{
    routes, AppState, Config, ConsoleNotifier, InMemoryStore, SqliteStore, Store, TokenKeys,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursehub_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    match &config.database_path {
        Some(path) => {
            let store = SqliteStore::open(path)?;
            tracing::info!(path = %path, "Using SQLite store");
            serve(&config, store).await
        }
        None => {
            tracing::warn!("DATABASE_PATH not set, data will not survive a restart");
            serve(&config, InMemoryStore::new()).await
        }
    }
}

async fn serve<S: Store + 'static>(config: &Config, store: S) -> Result<()> {
    let state = Arc::new(AppState::new(
        store,
        ConsoleNotifier::new(),
        TokenKeys::from_secret(config.jwt_secret.as_bytes()),
        chrono::Duration::seconds(config.roster_staleness_secs),
    ));

    let app = routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Coursehub listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
