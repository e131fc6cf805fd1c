//! TOML configuration for the auditor.
//!
//! A `HousekeepingConfig` is deserialized from TOML and holds the scan
//! settings plus an ordered list of `RuleConfig`s. Rules are composed into a
//! `RuleRegistry` in declaration order; that order is the order of
//! `rule_evaluation` entries in every verdict record.
//!
//! Example:
//! ```toml
//! [scan]
//! interval_secs = 60
//! excluded_namespaces = ["kube-system", "housekeeping"]
//!
//! [[rules]]
//! kind = "image-prefix"
//! allowed_prefixes = ["bitnami/"]
//!
//! [[rules]]
//! kind = "required-label"
//! key = "team"
//!
//! [[rules]]
//! kind = "recency"
//! window_secs = 604800
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use housekeeping_contracts::error::{HousekeepingError, HousekeepingResult};
use housekeeping_core::{
    scanner::{DEFAULT_EXCLUDED_NAMESPACES, DEFAULT_SCAN_INTERVAL},
    traits::Predicate,
    RuleRegistry, ScanFilter,
};

use crate::predicates::{
    ImagePrefixRule, RecencyRule, RequiredLabelRule, DEFAULT_RECENCY_WINDOW_SECS,
    DEFAULT_REGISTRY,
};

fn default_interval_secs() -> u64 {
    DEFAULT_SCAN_INTERVAL.as_secs()
}

fn default_excluded_namespaces() -> Vec<String> {
    DEFAULT_EXCLUDED_NAMESPACES.iter().map(|s| s.to_string()).collect()
}

fn default_registry() -> Option<String> {
    Some(DEFAULT_REGISTRY.to_string())
}

fn default_window_secs() -> i64 {
    DEFAULT_RECENCY_WINDOW_SECS
}

/// Scan-loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanConfig {
    /// Seconds to sleep before each tick. Must be greater than zero.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Namespaces whose workloads are never evaluated.
    #[serde(default = "default_excluded_namespaces")]
    pub excluded_namespaces: Vec<String>,

    /// Add `evaluated_at` to every verdict record.
    #[serde(default)]
    pub include_timestamp: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            excluded_namespaces: default_excluded_namespaces(),
            include_timestamp: false,
        }
    }
}

impl ScanConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn filter(&self) -> ScanFilter {
        ScanFilter::new(self.excluded_namespaces.iter().cloned())
    }
}

/// One rule declaration.
///
/// `kind` selects the predicate; `name` overrides its default wire name.
/// Expressed in TOML as kebab-case:
/// ```toml
/// kind = "image-prefix"
/// kind = "required-label"
/// kind = "recency"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum RuleConfig {
    ImagePrefix {
        #[serde(default)]
        name: Option<String>,
        allowed_prefixes: Vec<String>,
        /// Registry prefix stripped before matching. Set to `""` to disable.
        #[serde(default = "default_registry")]
        default_registry: Option<String>,
    },
    RequiredLabel {
        #[serde(default)]
        name: Option<String>,
        key: String,
    },
    Recency {
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "default_window_secs")]
        window_secs: i64,
    },
}

impl RuleConfig {
    /// Build the predicate this declaration describes.
    ///
    /// Returns `ConfigError` for values no predicate can work with.
    pub fn build(&self) -> HousekeepingResult<Box<dyn Predicate>> {
        let rule: Box<dyn Predicate> = match self {
            RuleConfig::ImagePrefix {
                name,
                allowed_prefixes,
                default_registry,
            } => {
                if allowed_prefixes.iter().any(|p| p.trim().is_empty()) {
                    return Err(HousekeepingError::ConfigError {
                        reason: "image-prefix rule has an empty entry in allowed_prefixes"
                            .to_string(),
                    });
                }
                let mut rule = ImagePrefixRule::new(allowed_prefixes.iter().cloned())
                    .with_default_registry(default_registry.clone());
                if let Some(name) = name {
                    rule = rule.named(name.clone());
                }
                Box::new(rule)
            }

            RuleConfig::RequiredLabel { name, key } => {
                if key.trim().is_empty() {
                    return Err(HousekeepingError::ConfigError {
                        reason: "required-label rule has an empty key".to_string(),
                    });
                }
                let mut rule = RequiredLabelRule::new(key.clone());
                if let Some(name) = name {
                    rule = rule.named(name.clone());
                }
                Box::new(rule)
            }

            RuleConfig::Recency { name, window_secs } => {
                let window = chrono::Duration::try_seconds(*window_secs)
                    .filter(|w| *w > chrono::Duration::zero())
                    .ok_or_else(|| HousekeepingError::ConfigError {
                        reason: format!(
                            "recency rule window_secs must be positive, got {window_secs}"
                        ),
                    })?;
                let mut rule = RecencyRule::new(window);
                if let Some(name) = name {
                    rule = rule.named(name.clone());
                }
                Box::new(rule)
            }
        };

        Ok(rule)
    }
}

/// The top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HousekeepingConfig {
    #[serde(default)]
    pub scan: ScanConfig,

    /// Ordered rule declarations. Omitting the table yields the default set.
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleConfig>,
}

/// The rule set the auditor ships with: `image_prefix` (bitnami/),
/// `team_label_present`, `recent_start_time` (7 days).
pub fn default_rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig::ImagePrefix {
            name: None,
            allowed_prefixes: vec!["bitnami/".to_string()],
            default_registry: default_registry(),
        },
        RuleConfig::RequiredLabel {
            name: None,
            key: "team".to_string(),
        },
        RuleConfig::Recency {
            name: None,
            window_secs: DEFAULT_RECENCY_WINDOW_SECS,
        },
    ]
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            rules: default_rules(),
        }
    }
}

impl HousekeepingConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `HousekeepingError::ConfigError` if the TOML is malformed,
    /// does not match the schema, or fails validation.
    pub fn from_toml_str(s: &str) -> HousekeepingResult<Self> {
        let config: HousekeepingConfig =
            toml::from_str(s).map_err(|e| HousekeepingError::ConfigError {
                reason: format!("failed to parse configuration TOML: {}", e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> HousekeepingResult<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| HousekeepingError::ConfigError {
                reason: format!("failed to read configuration file '{}': {}", path.display(), e),
            })?;
        Self::from_toml_str(&contents)
    }

    /// Check values serde cannot express constraints for.
    pub fn validate(&self) -> HousekeepingResult<()> {
        if self.scan.interval_secs == 0 {
            return Err(HousekeepingError::ConfigError {
                reason: "scan.interval_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Compose the declared rules, in order, into a registry.
    ///
    /// Duplicate rule names are a `ConfigError`.
    pub fn build_registry(&self) -> HousekeepingResult<RuleRegistry> {
        let rules = self
            .rules
            .iter()
            .map(RuleConfig::build)
            .collect::<HousekeepingResult<Vec<_>>>()?;
        let registry = RuleRegistry::new(rules)?;
        debug!(rules = ?registry.names().collect::<Vec<_>>(), "rule registry built from configuration");
        Ok(registry)
    }
}
