//! Tracing setup for binaries embedding the core.

use tracing_subscriber::EnvFilter;

/// Install a global subscriber honoring `RUST_LOG`, falling back to the
/// configured filter. Safe to call once per process; later calls are
/// ignored.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
