//! Decoding of the Kubernetes `PodList` JSON document.
//!
//! Only the fields the auditor reads are modelled; everything else in the
//! document is ignored. Every modelled field is optional so that a sparse or
//! partially populated pod still decodes. Missing data then fails the
//! relevant predicate instead of failing the whole listing.
//!
//! The shape matches `kubectl get pods --all-namespaces -o json`:
//!
//! ```json
//! {"kind":"PodList","items":[{"metadata":{"name":"web-0","namespace":"shop",
//!   "labels":{"team":"x"},"creationTimestamp":"2024-06-15T11:00:00Z"},
//!   "spec":{"containers":[{"name":"web","image":"bitnami/nginx"}]},
//!   "status":{"phase":"Running"}}]}
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use housekeeping_contracts::{
    error::{HousekeepingError, HousekeepingResult},
    workload::{PodPhase, WorkloadSnapshot},
};

#[derive(Debug, Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    #[serde(default)]
    metadata: ObjectMeta,
    #[serde(default)]
    spec: PodSpec,
    #[serde(default)]
    status: PodStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMeta {
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    labels: Option<BTreeMap<String, String>>,
    #[serde(default)]
    creation_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct PodSpec {
    /// Declared containers only. `initContainers` and `ephemeralContainers`
    /// are intentionally not read.
    #[serde(default)]
    containers: Vec<Container>,
}

#[derive(Debug, Deserialize)]
struct Container {
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PodStatus {
    #[serde(default)]
    phase: Option<PodPhase>,
}

impl Pod {
    fn into_snapshot(self) -> WorkloadSnapshot {
        WorkloadSnapshot {
            identity: self.metadata.name,
            namespace: self.metadata.namespace,
            labels: self.metadata.labels.unwrap_or_default(),
            // A container without an image reference becomes "", which the
            // image rule treats as a violation.
            container_images: self
                .spec
                .containers
                .into_iter()
                .map(|c| c.image.unwrap_or_default())
                .collect(),
            creation_time: self.metadata.creation_timestamp,
            phase: self.status.phase.unwrap_or_default(),
        }
    }
}

/// Decode a `PodList` document into snapshots, preserving item order.
///
/// Returns `HousekeepingError::StateSource` if `bytes` is not a JSON
/// `PodList`. An empty `items` array is a valid, empty listing.
pub fn parse_pod_list(bytes: &[u8]) -> HousekeepingResult<Vec<WorkloadSnapshot>> {
    let list: PodList = serde_json::from_slice(bytes).map_err(|e| HousekeepingError::StateSource {
        reason: format!("failed to decode PodList JSON: {e}"),
    })?;
    Ok(list.items.into_iter().map(Pod::into_snapshot).collect())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use housekeeping_contracts::{error::HousekeepingError, workload::PodPhase};

    use super::parse_pod_list;

    const POD_LIST: &str = r#"{
        "apiVersion": "v1",
        "kind": "PodList",
        "items": [
            {
                "metadata": {
                    "name": "web-0",
                    "namespace": "shop",
                    "uid": "5d3c",
                    "labels": {"team": "payments", "app": "web"},
                    "creationTimestamp": "2024-06-15T11:00:00Z"
                },
                "spec": {
                    "initContainers": [{"name": "init", "image": "busybox"}],
                    "containers": [
                        {"name": "web", "image": "docker.io/bitnami/nginx:1.25"},
                        {"name": "sidecar", "image": "bitnami/fluent-bit"}
                    ]
                },
                "status": {"phase": "Running", "podIP": "10.0.0.4"}
            },
            {
                "metadata": {"name": "coredns-1", "namespace": "kube-system"},
                "spec": {"containers": [{"name": "coredns"}]},
                "status": {"phase": "Pending"}
            }
        ]
    }"#;

    #[test]
    fn decodes_the_fields_the_auditor_reads() {
        let pods = parse_pod_list(POD_LIST.as_bytes()).unwrap();
        assert_eq!(pods.len(), 2);

        let web = &pods[0];
        assert_eq!(web.identity, "web-0");
        assert_eq!(web.namespace, "shop");
        assert_eq!(web.label("team"), Some("payments"));
        assert_eq!(
            web.container_images,
            vec!["docker.io/bitnami/nginx:1.25", "bitnami/fluent-bit"],
            "init containers must not be included"
        );
        assert_eq!(
            web.creation_time,
            Some(Utc.with_ymd_and_hms(2024, 6, 15, 11, 0, 0).unwrap())
        );
        assert_eq!(web.phase, PodPhase::Running);
    }

    #[test]
    fn sparse_pods_decode_with_missing_data() {
        let pods = parse_pod_list(POD_LIST.as_bytes()).unwrap();
        let dns = &pods[1];

        assert!(dns.labels.is_empty());
        assert_eq!(dns.container_images, vec![""]);
        assert!(dns.creation_time.is_none());
        assert_eq!(dns.phase, PodPhase::Pending);
    }

    #[test]
    fn item_without_sections_decodes_to_empty_snapshot() {
        let pods = parse_pod_list(br#"{"items":[{}]}"#).unwrap();
        assert_eq!(pods.len(), 1);
        assert!(pods[0].identity.is_empty());
        assert!(pods[0].container_images.is_empty());
        assert_eq!(pods[0].phase, PodPhase::Unknown);
    }

    #[test]
    fn empty_list_is_a_valid_listing() {
        assert!(parse_pod_list(br#"{"kind":"PodList","items":[]}"#).unwrap().is_empty());
        assert!(parse_pod_list(br#"{"kind":"PodList"}"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_document_is_a_state_source_error() {
        match parse_pod_list(b"error: You must be logged in to the server") {
            Err(HousekeepingError::StateSource { reason }) => {
                assert!(reason.contains("PodList"), "unexpected reason: {reason}");
            }
            other => panic!("expected StateSource error, got {:?}", other),
        }
    }
}
