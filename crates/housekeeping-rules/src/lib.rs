//! # housekeeping-rules
//!
//! Built-in compliance predicates and the TOML configuration that composes
//! them into a [`RuleRegistry`](housekeeping_core::RuleRegistry).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use housekeeping_rules::HousekeepingConfig;
//!
//! let config = HousekeepingConfig::from_file(Path::new("housekeeping.toml"))?;
//! let registry = config.build_registry()?;
//! ```
//!
//! ## Built-in rules
//!
//! | kind             | default name          | passes when                                   |
//! |------------------|-----------------------|-----------------------------------------------|
//! | `image-prefix`   | `image_prefix`        | every container image has an allowed prefix   |
//! | `required-label` | `<key>_label_present` | the label is present and non-empty            |
//! | `recency`        | `recent_start_time`   | the workload was created within the window    |

pub mod config;
pub mod predicates;

pub use config::{default_rules, HousekeepingConfig, RuleConfig, ScanConfig};
pub use predicates::{ImagePrefixRule, RecencyRule, RequiredLabelRule};

// ── Tests ─────────────────────────────────────────────────────────────────────
