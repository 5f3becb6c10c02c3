//! Logging initialization
//!
//! Call sites use the `log` facade; records are bridged into a `tracing`
//! subscriber so `RUST_LOG` filtering works the same for our crate and for
//! teloxide/redis internals.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(dev_mode: bool) -> &'static str {
    if dev_mode {
        "info,mangibot=debug"
    } else {
        "info"
    }
}

/// Initialize the global logger
///
/// # Arguments
/// * `dev_mode` - Enables debug output for this crate
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - A global logger was already installed
pub fn init_logger(dev_mode: bool) -> Result<()> {
    tracing_log::LogTracer::init().map_err(|e| anyhow::anyhow!("Failed to install log bridge: {}", e))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(dev_mode)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(dev_mode)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_by_mode() {
        assert_eq!(default_filter(false), "info");
        assert!(default_filter(true).contains("mangibot=debug"));
    }
}
