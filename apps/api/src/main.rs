//! Startup check for the command layer.
//!
//! Loads configuration, opens the database (applying migrations) and reports
//! whether it is ready. The HTTP collaborator links the library directly.

use std::process::ExitCode;

use tracing::{error, info};

use renthub_api::{init_tracing, AppConfig, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    info!("Starting RentHub command layer");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = match AppState::open(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Database initialization failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !state.db.health_check().await {
        error!("Database is not responding");
        return ExitCode::FAILURE;
    }

    info!(
        upload_prefix = %state.config.upload_prefix,
        max_images = state.config.max_images,
        "Database ready"
    );

    state.db.close().await;
    ExitCode::SUCCESS
}
