//! Workload snapshot types.
//!
//! A `WorkloadSnapshot` is the read-only view of one pod that the state
//! source hands to the evaluation engine. It carries only the fields the
//! predicates and the scan filter read.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a workload instance.
///
/// Mirrors the Kubernetes pod phase. Any phase string this crate does not
/// know deserializes to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PodPhase {
    /// True only for the actively running phase.
    pub fn is_running(self) -> bool {
        matches!(self, PodPhase::Running)
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A point-in-time snapshot of one workload instance.
///
/// Snapshots are never mutated by the core. Predicates receive `&WorkloadSnapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSnapshot {
    /// Workload name, unique within its namespace.
    pub identity: String,
    /// Namespace the workload lives in; used by the scan filter.
    pub namespace: String,
    /// Metadata labels. Only presence and value matter, never order.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Image references of the declared containers, in declaration order.
    ///
    /// Init and ephemeral containers are not included.
    #[serde(default)]
    pub container_images: Vec<String>,
    /// When the workload was admitted. `None` when the source did not report it.
    #[serde(default)]
    pub creation_time: Option<DateTime<Utc>>,
    /// Current lifecycle phase.
    #[serde(default)]
    pub phase: PodPhase,
}

impl WorkloadSnapshot {
    /// Start a snapshot with the given identity and namespace and no other data.
    ///
    /// Mostly useful in tests and fixtures; sources build the full struct.
    pub fn new(identity: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            container_images: Vec::new(),
            creation_time: None,
            phase: PodPhase::Unknown,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.container_images.push(image.into());
        self
    }

    pub fn with_creation_time(mut self, at: DateTime<Utc>) -> Self {
        self.creation_time = Some(at);
        self
    }

    pub fn with_phase(mut self, phase: PodPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Return the label value for `key`, if present.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}
