//! `Context`: the by-reference bundle that replaces ambient global allocator
//! and global `status()`/`die()`-style logging with an explicit, passed-around
//! handle.
//!
//! Every allocation inside [`crate::hash_table::HashTable`],
//! [`crate::graph::store::GraphStore`], and [`crate::paths::store::PathStore`]
//! is sized from an explicit capacity argument supplied by the caller, never
//! reached for globally; `Context` only carries configuration and a shared
//! cancellation flag for long-running parallel phases.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::Config;

/// Shared, cheaply-cloneable handle passed to long-running driver operations
/// (loading, merging, health-checking) so they can be configured and, in the
/// case of parallel phases, cooperatively cancelled.
#[derive(Clone)]
pub struct Context {
    /// Active configuration.
    pub config: Arc<Config>,
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// Build a context from a configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request that in-progress parallel work stop at its next shard boundary.
    /// There is no in-flight cancellation: workers finish their current shard
    /// and then observe this flag before picking up the next one.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether [`Context::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
