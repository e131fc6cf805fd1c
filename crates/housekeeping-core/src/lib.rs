//! # housekeeping-core
//!
//! The rule evaluation engine of the housekeeping compliance auditor.
//!
//! This crate provides:
//! - The three boundary traits (`Predicate`, `StateSource`, `VerdictSink`)
//! - `RuleRegistry`, the fixed ordered set of predicates
//! - The evaluation engine (`engine::evaluate`, `engine::evaluate_at`)
//! - `Scanner`, the interval-paced scan loop that wires them together
//!
//! ## Usage
//!
//! ```rust,ignore
//! use housekeeping_core::{RuleRegistry, ScanFilter, Scanner};
//!
//! let registry = Arc::new(RuleRegistry::new(rules)?);
//! let scanner = Scanner::new(registry, source, sink, ScanFilter::default(), interval);
//! let stats = scanner.run(shutdown_rx).await;
//! ```

pub mod engine;
pub mod registry;
pub mod scanner;
pub mod traits;

pub use registry::RuleRegistry;
pub use scanner::{ScanFilter, ScanStats, Scanner, TickSummary};
pub use traits::{FnPredicate, Predicate, StateSource, VerdictSink};
