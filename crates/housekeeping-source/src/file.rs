//! A state source that re-reads a `PodList` JSON file on every fetch.
//!
//! Useful when another process (a cron'd `kubectl`, a sidecar, a test
//! harness) keeps the file current.

use std::path::{Path, PathBuf};

use tracing::debug;

use housekeeping_contracts::{
    error::{HousekeepingError, HousekeepingResult},
    workload::WorkloadSnapshot,
};
use housekeeping_core::traits::StateSource;

use crate::pod_list::parse_pod_list;

#[derive(Debug, Clone)]
pub struct PodListFileSource {
    path: PathBuf,
}

impl PodListFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateSource for PodListFileSource {
    fn list_workloads(&self) -> HousekeepingResult<Vec<WorkloadSnapshot>> {
        let bytes = std::fs::read(&self.path).map_err(|e| HousekeepingError::StateSource {
            reason: format!("failed to read pod list '{}': {}", self.path.display(), e),
        })?;
        let workloads = parse_pod_list(&bytes)?;
        debug!(path = %self.path.display(), count = workloads.len(), "pod list read from file");
        Ok(workloads)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use housekeeping_contracts::error::HousekeepingError;
    use housekeeping_core::traits::StateSource;

    use super::PodListFileSource;

    fn pod_list(names: &[&str]) -> String {
        let items: Vec<String> = names
            .iter()
            .map(|n| {
                format!(
                    r#"{{"metadata":{{"name":"{n}","namespace":"default"}},"status":{{"phase":"Running"}}}}"#
                )
            })
            .collect();
        format!(r#"{{"kind":"PodList","items":[{}]}}"#, items.join(","))
    }

    #[test]
    fn reads_current_file_contents_on_each_fetch() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = PodListFileSource::new(file.path());

        std::fs::write(file.path(), pod_list(&["a"])).unwrap();
        assert_eq!(source.list_workloads().unwrap().len(), 1);

        std::fs::write(file.path(), pod_list(&["a", "b", "c"])).unwrap();
        let names: Vec<_> = source
            .list_workloads()
            .unwrap()
            .into_iter()
            .map(|w| w.identity)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_file_is_a_state_source_error() {
        let source = PodListFileSource::new("/nonexistent/pods.json");
        match source.list_workloads() {
            Err(HousekeepingError::StateSource { reason }) => {
                assert!(reason.contains("/nonexistent/pods.json"), "unexpected reason: {reason}");
            }
            other => panic!("expected StateSource error, got {:?}", other),
        }
    }

    #[test]
    fn truncated_file_is_a_state_source_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"kind":"PodList","items":[{{"metadata":"#).unwrap();

        let source = PodListFileSource::new(file.path());
        assert!(matches!(
            source.list_workloads(),
            Err(HousekeepingError::StateSource { .. })
        ));
    }
}
