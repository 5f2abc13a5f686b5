//! Logging setup.
//!
//! The engine itself only emits `tracing` events; applications that want to
//! see them install a subscriber here. `DEEPASSIGN_LOG` overrides the
//! configured level with any `EnvFilter` directive.

use deepassign_types::{LogConfig, LogFormat, Result};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a filter directive that overrides the configured level.
pub const LOG_ENV: &str = "DEEPASSIGN_LOG";

/// Initialize the logging system with default configuration.
pub fn init_default() -> Result<()> {
    init(&LogConfig::default())
}

/// Initialize logging from configuration.
///
/// Safe to call more than once; only the first subscriber is installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let filter = build_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };

    if let Err(e) = installed {
        debug!("Logging already initialized: {}", e);
    }
    Ok(())
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()))
}
