//! Logging setup.
//!
//! The engine only emits `tracing` events; the binary decides where
//! they go.  The filter comes from `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=shiftpulse_engine=debug`.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Verbose logging routed through the test harness.  Safe to call from
/// several tests.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
