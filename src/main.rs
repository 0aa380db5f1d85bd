//! Entry point for the ShiftPulse engine binary.
//!
//! Running this binary will start an HTTP server that exposes the
//! dashboard, alert and attendance computations.  An engine
//! configuration file may be given via the `SHIFTPULSE_CONFIG`
//! environment variable; if unset the built-in defaults are used.  The
//! bind address comes from `SHIFTPULSE_BIND_ADDR`.

use std::path::PathBuf;
use tracing::error;

#[tokio::main]
async fn main() {
    shiftpulse_engine::logging::init();

    let config_path = std::env::var("SHIFTPULSE_CONFIG").ok().map(PathBuf::from);
    let addr = std::env::var("SHIFTPULSE_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    if let Err(err) = shiftpulse_engine::api::serve(&addr, config_path.as_deref()).await {
        error!(error = %err, "error running server");
        std::process::exit(1);
    }
}
