use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use bankside::{AppState, Config, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load().context("environment misconfigured")?;
    let addr = config.addr;

    info!(static_dir = %config.static_dir.display(), mail = config.mail.webhook.is_some(), "starting");
    let state = AppState::new(config);

    Server::bind(addr)
        .serve(bankside::app(), state)
        .await
        .context("server error")?;

    Ok(())
}
