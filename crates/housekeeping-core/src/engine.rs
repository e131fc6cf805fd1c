//! The evaluation engine: one workload snapshot in, one verdict record out.
//!
//! The engine walks the registry in order and records `{name, valid}` for
//! every rule. Each predicate call runs behind `catch_unwind`; a panicking
//! rule is recorded as failed and the remaining rules still run, so one bad
//! rule never costs the rest of the verdict.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use housekeeping_contracts::{
    error::HousekeepingError,
    verdict::{RuleEvaluation, VerdictRecord},
    workload::WorkloadSnapshot,
};

use crate::registry::RuleRegistry;

/// Evaluate `snapshot` against every rule in `registry` using the wall clock.
pub fn evaluate(registry: &RuleRegistry, snapshot: &WorkloadSnapshot) -> VerdictRecord {
    evaluate_at(registry, snapshot, Utc::now())
}

/// Evaluate `snapshot` against every rule in `registry` as of `now`.
///
/// Given the same snapshot and the same `now`, the result is identical.
/// The returned record has exactly `registry.len()` results, in registry
/// order. `evaluated_at` is left unset; the scanner stamps it when the
/// deployment asks for timestamps.
pub fn evaluate_at(
    registry: &RuleRegistry,
    snapshot: &WorkloadSnapshot,
    now: DateTime<Utc>,
) -> VerdictRecord {
    let mut results = Vec::with_capacity(registry.len());

    for rule in registry.iter() {
        let name = rule.name();
        let valid = match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(snapshot, now))) {
            Ok(valid) => valid,
            Err(payload) => {
                let err = HousekeepingError::PredicateFailed {
                    rule: name.to_string(),
                    reason: panic_message(payload.as_ref()),
                };
                warn!(
                    pod = %snapshot.identity,
                    namespace = %snapshot.namespace,
                    rule = %name,
                    error = %err,
                    "predicate panicked; recording as failed"
                );
                false
            }
        };

        results.push(RuleEvaluation {
            name: name.to_string(),
            valid,
        });
    }

    debug!(
        pod = %snapshot.identity,
        namespace = %snapshot.namespace,
        failed = results.iter().filter(|r| !r.valid).count(),
        "workload evaluated"
    );

    VerdictRecord {
        subject: snapshot.identity.clone(),
        results,
        evaluated_at: None,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
