//! Structured logging using **tracing**.
//!
//! Events go to stderr as JSON so stdout stays reserved for reports and
//! query results. Per-class failures, skipped classes and session
//! lifecycle are all logged through here or through `tracing` directly.

use tracing::{error, info, warn};

/// Initializes the global tracing subscriber.
///
/// Call once at startup. Filtering follows `RUST_LOG`
/// (e.g. `RUST_LOG=irmetrics_core=debug`).
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

pub fn log_info(message: &str) {
    info!(detail = %message);
}

pub fn log_error(message: &str) {
    error!(detail = %message);
}
