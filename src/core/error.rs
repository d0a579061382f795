//! Error types and result handling for the colored de Bruijn graph core.
//!
//! Every codec and store operation returns a `Result`; nothing in this crate
//! panics on malformed input or exhausted capacity. Non-fatal conditions
//! (a cleaning threshold present without cleaning enabled, a non-standard
//! shades field) are reported as [`Warning`]s on a side channel instead.

use thiserror::Error;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, CortexError>;

/// Top-level error type for hash table, graph store, path store, and codec operations.
#[derive(Error, Debug)]
pub enum CortexError {
    /// Underlying I/O failure reading or writing a `.ctx`/`.ctp` file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File structure violates a format invariant (bad magic, bad kmer size, non-zero
    /// high bits in a bkey, all-zero coverage row, ...).
    #[error("malformed input: {0}")]
    Malformed(String),

    /// Two things that must agree (kmer sizes, column counts) do not.
    #[error("incompatible: {0}")]
    Incompatible(String),

    /// A hash table or path arena has no room left for the requested insert.
    #[error("out of capacity: requested {requested}, available {available}")]
    OutOfCapacity {
        /// Number of additional slots/bytes the caller tried to use.
        requested: usize,
        /// Number of slots/bytes actually free at the time of the request.
        available: usize,
    },

    /// An invariant was violated that can only be detected after data has been
    /// loaded (a dangling edge, a path chain that overruns the arena).
    #[error("corrupted: {0}")]
    Corrupted(String),

    /// A read returned fewer bytes than the format requires at this point.
    #[error("truncated: expected {expected} bytes, got {got}")]
    Truncated {
        /// Bytes the reader expected to be available.
        expected: usize,
        /// Bytes actually read before the source ended.
        got: usize,
    },
}

impl CortexError {
    /// Shorthand for [`CortexError::Malformed`] taking any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Shorthand for [`CortexError::Incompatible`].
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::Incompatible(msg.into())
    }

    /// Shorthand for [`CortexError::Corrupted`].
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }
}

/// Non-fatal conditions surfaced alongside a successful [`Result`], never returned
/// as an error. Callers collect these into a side channel (e.g. `Vec<Warning>`
/// returned next to `Stats`/`HealthReport`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A color's cleaning thresholds were non-zero even though the matching
    /// cleaning boolean was false; the threshold was reset to zero.
    CleaningThresholdWithoutCleaning {
        /// Column the warning applies to.
        colour: usize,
    },
    /// The header's `num_of_shades` field was not a multiple of 8 (the field is
    /// unused by this crate but validated for round-trip fidelity).
    ShadesFieldNonStandard(u32),
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::CleaningThresholdWithoutCleaning { colour } => write!(
                f,
                "color {colour}: cleaning threshold present but cleaning disabled, zeroed"
            ),
            Warning::ShadesFieldNonStandard(v) => {
                write!(f, "num_of_shades {v} is not a multiple of 8")
            }
        }
    }
}
