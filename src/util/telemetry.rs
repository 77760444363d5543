//! Telemetry helpers for structured logging.

use tracing_subscriber::EnvFilter;

/// Install a default env-filtered subscriber if the caller has not set one.
/// Falls back to `info` when `RUST_LOG` is absent.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
