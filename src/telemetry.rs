//! Tracing installation for binaries and tests.
//!
//! The library itself only emits `tracing` spans and events; consumers that
//! want them rendered call [`init`] once at startup. Filtering follows
//! `RUST_LOG`, falling back to `info`.

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber with env-based filtering.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
