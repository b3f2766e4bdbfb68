//! SportsHub server: connect, apply the schema, serve the REST API until Ctrl-C.

use sportshub::{api_router, apply_schema, ensure_database_exists, AppState, PgStore, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sportshub=info")),
        )
        .init();

    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;
    if settings.apply_schema {
        apply_schema(&pool).await?;
    }

    let store = PgStore::new(pool);
    let state = AppState::new(Arc::new(store.clone()));
    let app = api_router(state).layer(RequestBodyLimitLayer::new(settings.body_limit));

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "sportshub listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("pool closed, bye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Ctrl-C received, shutting down");
}
