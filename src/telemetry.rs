//! Logging setup for binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! embedder's call.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global subscriber honouring `RUST_LOG`, with `default_directive`
/// as the fallback filter. Later calls are no-ops.
pub fn init_tracing(default_directive: &str) {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if installed.is_ok() {
        tracing::debug!(default = %default_directive, "Tracing initialised");
    }
}
