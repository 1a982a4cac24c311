use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    claimgate_observability::init();

    let config = claimgate_api::config::AppConfig::load()?;
    let app = claimgate_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
