use anyhow::Context;

use scopegate_api::{app, config::ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scopegate_observability::init();

    let config = ApiConfig::from_env()?;
    let state = app::services::build_gate(&config)?;
    let app = app::build_app(state)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
