//! Crowdmap service binary.
//!
//! Wires configuration, logging, the observation store, and the HTTP API
//! together, then serves until a shutdown signal arrives.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `crowdmap-config.yaml` and the environment
//! 2. Initialize structured logging (tracing)
//! 3. Open the observation store selected by the database URL
//! 4. Verify the store answers
//! 5. Serve the HTTP API until `Ctrl-C` or `SIGTERM`
//!
//! Any startup failure is logged and the process exits non-zero.

mod error;

use std::process::ExitCode;
use std::sync::Arc;

use crowdmap_api::{start_server, AppState, ServerConfig};
use crowdmap_core::config::LoggingSection;
use crowdmap_core::AppConfig;
use crowdmap_db::{mask_database_url, open_store};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Application entry point.
#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            init_logging(&LoggingSection::default());
            error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "crowdmap-server failed");
            ExitCode::FAILURE
        }
    }
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingSection) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Open the store and serve until shutdown.
async fn run(config: AppConfig) -> Result<(), AppError> {
    info!("crowdmap-server starting");

    let url = config.database_url()?.to_owned();
    info!(
        database_url = %mask_database_url(&url),
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    let store = open_store(&url, &config.database).await?;
    store.ping().await?;
    info!("Observation store ready");

    let server_config = ServerConfig::from(&config.server);
    let state = Arc::new(AppState::new(store, config));
    start_server(&server_config, state).await?;

    info!("crowdmap-server stopped");
    Ok(())
}
