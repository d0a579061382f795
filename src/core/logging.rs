//! Ambient logging. Hot loops (per-kmer load, per-slot health check) should
//! use `tracing::trace!`/`debug!` sparingly and never inside the innermost
//! probe loop — status lines belong at phase boundaries, not per-record.

use tracing_subscriber::EnvFilter;

/// Initialize the global `tracing` subscriber from `RUST_LOG`, falling back to
/// `default_level` when the environment variable is unset. Safe to call more
/// than once; later calls are no-ops.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
