pub mod config;
pub mod error;
pub mod outcome;

pub use config::{ApiConfig, Config, StorageConfig, ValidationResult};
pub use error::{AppError, ConfigError, WeatherError, UNEXPECTED_ERROR_MESSAGE};
pub use outcome::Outcome;

use anyhow::Result;

/// Initialize logging for the process.
///
/// Honours `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    tracing::info!("Nimbus core initialized");
    Ok(())
}
