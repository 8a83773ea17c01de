//! # Logging Setup
//!
//! One global `tracing` subscriber per process, filtered by `RUST_LOG`.
//!
//! ```text
//! RUST_LOG unset  →  info,indobat=debug,sqlx=warn
//! RUST_LOG=warn   →  warn everywhere
//! ```
//!
//! Logs go to stderr so CLI output on stdout stays machine-readable JSON.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,indobat=debug,sqlx=warn";

/// Initializes the tracing subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
