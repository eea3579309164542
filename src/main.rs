//! Libris Server: library catalogue and lending service.
//!
//! Main entry point that loads configuration, initializes logging, opens
//! the database, and serves the HTTP API.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use libris_core::config::AppConfig;
use libris_core::error::AppError;
use libris_core::traits::SystemClock;
use libris_database::DatabasePool;

#[tokio::main]
async fn main() {
    let env = std::env::var("LIBRIS_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(%env, version = env!("CARGO_PKG_VERSION"), "Starting Libris");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing. `RUST_LOG` overrides `logging.level`.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_current_span(false)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;

    if config.database.run_migrations {
        libris_database::migration::run_migrations(db.pool()).await?;
    } else {
        tracing::info!("Skipping migrations (database.run_migrations = false)");
    }

    let state = libris_api::build_state(config, db, Arc::new(SystemClock))?;
    libris_api::run_server(state).await
}
