//! Verdict records and scan identifiers.
//!
//! `VerdictRecord` is what the evaluation engine produces for one workload in
//! one tick and what the output sink serializes. Its JSON field names are an
//! external contract:
//!
//! ```json
//! {"pod":"p1","rule_evaluation":[{"name":"image_prefix","valid":true}]}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for one scan tick.
///
/// Attached to every log line of the tick so an operator can group them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(pub uuid::Uuid);

impl ScanId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The pass/fail outcome of one named rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEvaluation {
    /// The predicate name. Stable across a run; part of the wire contract.
    pub name: String,
    /// True if the workload satisfied the predicate.
    pub valid: bool,
}

/// The per-workload, per-tick verdict.
///
/// `results` holds exactly one entry per registered predicate, in registry
/// order. Records are built fresh, handed to the sink, and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    /// Identity of the evaluated workload.
    #[serde(rename = "pod")]
    pub subject: String,
    /// Ordered rule outcomes.
    #[serde(rename = "rule_evaluation")]
    pub results: Vec<RuleEvaluation>,
    /// When the record was produced. Only serialized when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl VerdictRecord {
    /// True only if every rule passed.
    pub fn is_compliant(&self) -> bool {
        self.results.iter().all(|r| r.valid)
    }

    /// Names of the rules that failed, in registry order.
    pub fn failed_rules(&self) -> impl Iterator<Item = &str> {
        self.results.iter().filter(|r| !r.valid).map(|r| r.name.as_str())
    }
}
