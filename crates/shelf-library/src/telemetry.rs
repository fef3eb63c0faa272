//! Tracing setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber for the process.
///
/// `RUST_LOG` wins when set; otherwise `fallback` (normally the configured
/// `log_filter`) is used, and `info` if that does not parse. Returns `false`
/// if a global subscriber was already installed.
pub fn init_tracing(fallback: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
