use anyhow::Context;
use tracing::info;

use loanapi_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    loanapi_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = loanapi_api::app::build_app(&config)
        .await
        .context("failed to wire services")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
