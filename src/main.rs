use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod middleware;
mod modules;
mod routes;
mod state;

use config::settings::AppConfig;
use infrastructure::db::pool;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,movies_api=debug,sqlx=warn")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new()?;

    let db = pool::connect_to_db(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    pool::run_migrations(&db)
        .await
        .context("failed to apply database migrations")?;

    let addr = format!("0.0.0.0:{}", config.server_port);
    let app = app::create_app(AppState::with_postgres(config, db));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
