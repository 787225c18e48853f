use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use schoolhub::logging::init_tracing;
use schoolhub::router::init_router;
use schoolhub::state::init_app_state;
use schoolhub_config::ServerConfig;
use schoolhub_db::{init_db_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let pool = init_db_pool().await?;
    run_migrations(&pool).await?;

    let state = init_app_state(pool);
    tokio::fs::create_dir_all(&state.media_config.temp_dir)
        .await
        .context("failed to create upload temp directory")?;
    tokio::fs::create_dir_all(&state.media_config.public_dir)
        .await
        .context("failed to create public directory")?;

    let app = init_router(state);

    let server = ServerConfig::from_env();
    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(port = server.port, "Server running");
    info!("Swagger UI available at /api-docs");

    axum::serve(listener, app).await?;
    Ok(())
}
