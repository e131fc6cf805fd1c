//! Core trait definitions for the housekeeping audit loop.
//!
//! These three traits define the boundary of the core:
//!
//! - `Predicate`  : one named compliance check over a workload snapshot
//! - `StateSource`: where workload snapshots come from (the cluster)
//! - `VerdictSink`: where verdict records go (stdout, a queue, ...)
//!
//! The scanner wires them together. Nothing in the core knows how a source
//! talks to the cluster or how a sink persists a record.

use chrono::{DateTime, Utc};

use housekeeping_contracts::{
    error::HousekeepingResult,
    verdict::VerdictRecord,
    workload::WorkloadSnapshot,
};

/// A named compliance check.
///
/// Implementations must be total: every well-formed snapshot yields a
/// boolean. Missing data (an absent label, no creation time) is a failing
/// result, never an error. The engine still guards each call, so a panic
/// costs only this predicate's result.
pub trait Predicate: Send + Sync {
    /// Stable name of this rule. Appears verbatim in every verdict record.
    fn name(&self) -> &str;

    /// Evaluate the rule against `snapshot`.
    ///
    /// `now` is the evaluation instant. Only time-relative rules read it; all
    /// other rules must give the same answer for any `now`.
    fn evaluate(&self, snapshot: &WorkloadSnapshot, now: DateTime<Utc>) -> bool;
}

/// The cluster state source.
pub trait StateSource: Send + Sync {
    /// Return the current population of workloads.
    ///
    /// An empty vector is a valid listing. Transport, auth, or decoding
    /// failures must return `HousekeepingError::StateSource`.
    fn list_workloads(&self) -> HousekeepingResult<Vec<WorkloadSnapshot>>;
}

/// The output sink for verdict records.
pub trait VerdictSink: Send + Sync {
    /// Emit one record. Called at most once per record, never retried.
    ///
    /// A failure means the record is lost; return
    /// `HousekeepingError::SinkWriteFailed` so the scanner can report it.
    fn emit(&self, record: &VerdictRecord) -> HousekeepingResult<()>;
}

/// A predicate built from a name and a function value.
///
/// ```rust,ignore
/// let rule = FnPredicate::new("has_owner", |s, _now| s.label("owner").is_some());
/// ```
pub struct FnPredicate<F> {
    name: String,
    f: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&WorkloadSnapshot, DateTime<Utc>) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&WorkloadSnapshot, DateTime<Utc>) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, snapshot: &WorkloadSnapshot, now: DateTime<Utc>) -> bool {
        (self.f)(snapshot, now)
    }
}
