//! Built-in compliance predicates.
//!
//! Every predicate here fails closed: absent or empty data produces `false`,
//! never an error. Only `RecencyRule` reads the evaluation instant.

use chrono::{DateTime, Duration, Utc};

use housekeeping_contracts::workload::WorkloadSnapshot;
use housekeeping_core::traits::Predicate;

pub const IMAGE_PREFIX_RULE: &str = "image_prefix";
pub const RECENT_START_TIME_RULE: &str = "recent_start_time";

/// Registry prefix stripped from image references before matching.
pub const DEFAULT_REGISTRY: &str = "docker.io/";

/// Lookback window for the recency rule, in seconds (7 days).
pub const DEFAULT_RECENCY_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

/// Default rule name for a required label key: `<key>_label_present`.
pub fn label_rule_name(key: &str) -> String {
    format!("{key}_label_present")
}

// ── Image provenance ──────────────────────────────────────────────────────────

/// Passes iff every declared container image comes from an allow-listed
/// registry/org prefix.
///
/// Each reference is normalized by stripping `default_registry` from its
/// start, so `docker.io/bitnami/nginx` and `bitnami/nginx` are the same
/// image. A workload with no containers passes: there is no violating
/// evidence. Init and ephemeral containers are not part of the snapshot and
/// are therefore not checked.
#[derive(Debug, Clone)]
pub struct ImagePrefixRule {
    name: String,
    allowed_prefixes: Vec<String>,
    default_registry: Option<String>,
}

impl ImagePrefixRule {
    pub fn new<I, S>(allowed_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: IMAGE_PREFIX_RULE.to_string(),
            allowed_prefixes: allowed_prefixes.into_iter().map(Into::into).collect(),
            default_registry: Some(DEFAULT_REGISTRY.to_string()),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the registry prefix stripped during normalization.
    /// `None` disables normalization.
    pub fn with_default_registry(mut self, registry: Option<String>) -> Self {
        self.default_registry = registry.filter(|r| !r.is_empty());
        self
    }

    /// Strip the default registry from the start of `image`, once.
    pub fn normalize<'a>(&self, image: &'a str) -> &'a str {
        match &self.default_registry {
            Some(registry) => image.strip_prefix(registry.as_str()).unwrap_or(image),
            None => image,
        }
    }

    fn is_allowed(&self, image: &str) -> bool {
        let image = self.normalize(image);
        !image.is_empty()
            && self
                .allowed_prefixes
                .iter()
                .any(|prefix| !prefix.is_empty() && image.starts_with(prefix.as_str()))
    }
}

impl Predicate for ImagePrefixRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, snapshot: &WorkloadSnapshot, _now: DateTime<Utc>) -> bool {
        snapshot.container_images.iter().all(|image| self.is_allowed(image))
    }
}

// ── Required label ────────────────────────────────────────────────────────────

/// Passes iff the workload carries `key` with a non-empty value.
#[derive(Debug, Clone)]
pub struct RequiredLabelRule {
    name: String,
    key: String,
}

impl RequiredLabelRule {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            name: label_rule_name(&key),
            key,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Predicate for RequiredLabelRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, snapshot: &WorkloadSnapshot, _now: DateTime<Utc>) -> bool {
        snapshot.label(&self.key).is_some_and(|value| !value.is_empty())
    }
}

// ── Recency ───────────────────────────────────────────────────────────────────

/// Passes iff the workload was created strictly within `window` before `now`.
///
/// Measured from the workload's creation timestamp, not from when its
/// containers last started. The same snapshot may pass now and fail later;
/// that is expected. A missing creation time fails.
#[derive(Debug, Clone)]
pub struct RecencyRule {
    name: String,
    window: Duration,
}

impl RecencyRule {
    pub fn new(window: Duration) -> Self {
        Self {
            name: RECENT_START_TIME_RULE.to_string(),
            window,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RecencyRule {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_RECENCY_WINDOW_SECS))
    }
}

impl Predicate for RecencyRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, snapshot: &WorkloadSnapshot, now: DateTime<Utc>) -> bool {
        match (snapshot.creation_time, now.checked_sub_signed(self.window)) {
            (Some(created), Some(cutoff)) => created > cutoff,
            _ => false,
        }
    }
}
