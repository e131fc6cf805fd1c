//! # housekeeping-contracts
//!
//! Shared types, wire formats, and error contracts for the housekeeping
//! compliance auditor.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod verdict;
pub mod workload;
