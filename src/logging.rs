//! Structured logging, initialised once from `main`.
//!
//! `memrel` has no JSON/pretty toggle or query-logging flag of its own;
//! there's no config surface to hang one off yet.

use tracing_subscriber::EnvFilter;

/// Initialises a process-global `tracing` subscriber reading `RUST_LOG`,
/// defaulting to `info` when unset or invalid.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
