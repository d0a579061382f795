//! Core foundations: error handling, configuration, logging, and the
//! by-reference [`Context`] that carries them.

/// Error types and result handling.
pub mod error;
/// Configuration management.
pub mod config;
/// Ambient logging setup.
pub mod logging;
/// Shared context passed to driver-facing operations.
pub mod context;

pub use error::{CortexError, Result, Warning};
pub use config::Config;
pub use context::Context;
