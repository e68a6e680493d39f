// Logging setup
//
// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to the
// given directive. Safe to call more than once.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber; returns `false` if one was already set
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .try_init()
        .is_ok()
}
