//! Tracing subscriber setup for binaries embedding the service
use super::config::ServiceConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter that wins over the configured level.
pub const LOG_ENV: &str = "SUBMISSION_LOG";

/// Installs a global fmt subscriber. Fails if one is already installed.
pub fn init(config: &ServiceConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|error| anyhow::anyhow!("invalid log filter {:?}: {error}", config.log_level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
