mod routes;
mod singleton;
mod state;
mod viewer;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sharecal_core::config::SharecalConfig;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = SharecalConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();

    tracing::debug!(config = ?config, "Configuration loaded");

    // Ensure only one instance serves this data directory
    let _lock = singleton::acquire_lock(&config.data_path())?;

    let addr = config.listen;
    let state = AppState::new(config)?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "sharecal-server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
