pub mod api;
pub mod capabilities;
pub mod config;
pub mod core_state;
pub mod db;
pub mod forms;
pub mod insights;
pub mod listing;
pub mod models;
pub mod reference;
pub mod reports;
pub mod scheduling;
pub mod stats;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Startup failures that stop the process.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Core(#[from] core_state::CoreError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[from] std::io::Error),
}

pub async fn run() -> Result<(), RunError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = config::AppConfig::from_env()?;
    let core = Arc::new(core_state::CoreState::initialize(&app_config)?);

    let mut server = api::start_server(core, app_config.bind_addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    server.stopped().await;
    Ok(())
}
