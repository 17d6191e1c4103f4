//! Logging initialization
//!
//! Structured logging via `tracing` with an environment-driven filter.
//! `RUST_LOG` wins when set; otherwise the configured default level applies.

use crate::config::LogSettings;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Call once at startup before any component logs. A second call is a
/// harmless no-op so test harnesses that pre-install a subscriber keep
/// working.
pub fn init_logging(cfg: &LogSettings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));

    if cfg.json {
        let _ = tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    }
}
