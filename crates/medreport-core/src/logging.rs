//! Tracing subscriber setup

use medreport_config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber. Returns `false` if one was already set.
///
/// An unparsable configured filter falls back to `RUST_LOG`, then to `info`.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_new(&config.filter)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
        .is_ok()
}
