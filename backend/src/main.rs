use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backend::config::AppConfig;
use backend::identity::{HttpIdentityBackend, IdentityBackend};
use backend::web_server::{run_server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let identity: Arc<dyn IdentityBackend> =
        Arc::new(HttpIdentityBackend::new(config.identity.clone()));
    let state = AppState { config, identity };

    tracing::info!("Initializing server...");
    run_server(state).await
}
