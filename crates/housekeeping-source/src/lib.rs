//! # housekeeping-source
//!
//! Cluster state sources for the housekeeping auditor.
//!
//! Both sources decode the Kubernetes `PodList` JSON document and implement
//! [`StateSource`](housekeeping_core::traits::StateSource):
//!
//! - [`KubectlSource`] runs `kubectl get pods --all-namespaces -o json`.
//! - [`PodListFileSource`] re-reads a JSON file on every fetch.

pub mod file;
pub mod kubectl;
pub mod pod_list;

pub use file::PodListFileSource;
pub use kubectl::KubectlSource;
pub use pod_list::parse_pod_list;
