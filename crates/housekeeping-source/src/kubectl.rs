//! A state source that shells out to `kubectl` for every fetch.
//!
//! The command must print a `PodList` JSON document on stdout. A non-zero
//! exit status is a state-source failure carrying the command's stderr,
//! which covers expired credentials and an unreachable API server.

use std::process::Command;

use tracing::debug;

use housekeeping_contracts::{
    error::{HousekeepingError, HousekeepingResult},
    workload::WorkloadSnapshot,
};
use housekeeping_core::traits::StateSource;

use crate::pod_list::parse_pod_list;

/// Arguments that list pods in every namespace as JSON.
pub const DEFAULT_KUBECTL_ARGS: &[&str] = &["get", "pods", "--all-namespaces", "-o", "json"];

#[derive(Debug, Clone)]
pub struct KubectlSource {
    program: String,
    args: Vec<String>,
}

impl KubectlSource {
    /// `kubectl get pods --all-namespaces -o json`, using whatever kubeconfig
    /// or in-cluster credentials `kubectl` itself picks up.
    pub fn new() -> Self {
        Self::with_command("kubectl", DEFAULT_KUBECTL_ARGS.iter().copied())
    }

    /// Run `program` with `args` instead.
    pub fn with_command<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for KubectlSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StateSource for KubectlSource {
    fn list_workloads(&self) -> HousekeepingResult<Vec<WorkloadSnapshot>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| HousekeepingError::StateSource {
                reason: format!("failed to run '{}': {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HousekeepingError::StateSource {
                reason: format!("'{}' exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }

        let workloads = parse_pod_list(&output.stdout)?;
        debug!(program = %self.program, count = workloads.len(), "pod list read from command");
        Ok(workloads)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use housekeeping_contracts::error::HousekeepingError;
    use housekeeping_core::traits::StateSource;

    use super::KubectlSource;

    fn sh(script: &str) -> KubectlSource {
        KubectlSource::with_command("sh", ["-c", script])
    }

    #[test]
    fn parses_command_stdout() {
        let source = sh(
            r#"echo '{"kind":"PodList","items":[{"metadata":{"name":"p1","namespace":"default"}}]}'"#,
        );
        let workloads = source.list_workloads().unwrap();
        assert_eq!(workloads.len(), 1);
        assert_eq!(workloads[0].identity, "p1");
    }

    #[test]
    fn non_zero_exit_carries_stderr() {
        let source = sh("echo 'Unauthorized' >&2; exit 1");
        match source.list_workloads() {
            Err(HousekeepingError::StateSource { reason }) => {
                assert!(reason.contains("Unauthorized"), "unexpected reason: {reason}");
            }
            other => panic!("expected StateSource error, got {:?}", other),
        }
    }

    #[test]
    fn missing_program_is_a_state_source_error() {
        let source = KubectlSource::with_command("/nonexistent/kubectl", Vec::<String>::new());
        assert!(matches!(
            source.list_workloads(),
            Err(HousekeepingError::StateSource { .. })
        ));
    }
}
