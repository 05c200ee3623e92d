pub mod config;
pub mod error;

pub use config::{
    ClockConfig, Config, ConfigIssue, ConfigReport, LocationConfig, Severity, WeatherConfig,
};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize logging for the application.
///
/// Logs go to stderr; stdout belongs to the dashboard.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("Meteoclock core initialized");
    Ok(())
}
