//! Runtime error types for the housekeeping audit loop.
//!
//! All fallible operations return `HousekeepingResult<T>`. Only
//! `ConfigError` is fatal; every other variant is contained to the smallest
//! scope it occurred in (one predicate, one record, one tick).

use thiserror::Error;

/// The unified error type for the housekeeping crates.
#[derive(Debug, Error)]
pub enum HousekeepingError {
    /// A rule definition or configuration value is malformed, or two rules
    /// share a name.
    ///
    /// Raised at startup only. The process must not begin scanning.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The cluster state source could not produce a workload listing.
    ///
    /// The current tick is abandoned; the loop waits for the next one.
    #[error("state source failed: {reason}")]
    StateSource { reason: String },

    /// A predicate panicked instead of returning a boolean.
    ///
    /// Recorded as a failed result for that one rule only.
    #[error("predicate '{rule}' failed: {reason}")]
    PredicateFailed { rule: String, reason: String },

    /// The output sink could not accept a verdict record. The record is lost.
    #[error("sink write failed: {reason}")]
    SinkWriteFailed { reason: String },
}

/// Convenience alias used throughout the housekeeping crates.
pub type HousekeepingResult<T> = Result<T, HousekeepingError>;
