//! Wiring: configuration → registry → scanner.
//!
//! Kept apart from `main` so the assembled pipeline can be exercised in tests
//! with an in-memory sink and a file-backed source.

use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use housekeeping_contracts::error::HousekeepingResult;
use housekeeping_core::{
    traits::{StateSource, VerdictSink},
    Scanner,
};
use housekeeping_rules::HousekeepingConfig;

/// Load configuration from `path` (or defaults) and apply CLI overrides.
///
/// The result is validated after overrides, so `--interval-secs 0` is a
/// `ConfigError` like `interval_secs = 0` in the file.
pub fn load_config(
    path: Option<&Path>,
    interval_secs: Option<u64>,
) -> HousekeepingResult<HousekeepingConfig> {
    let mut config = match path {
        Some(path) => HousekeepingConfig::from_file(path)?,
        None => HousekeepingConfig::default(),
    };
    if let Some(secs) = interval_secs {
        config.scan.interval_secs = secs;
    }
    config.validate()?;
    Ok(config)
}

/// Build the registry from `config` and assemble a scanner around it.
///
/// Fails with `ConfigError` on an invalid rule set; no scanning may start.
pub fn build_scanner(
    config: &HousekeepingConfig,
    source: Box<dyn StateSource>,
    sink: Box<dyn VerdictSink>,
) -> HousekeepingResult<Scanner> {
    let registry = Arc::new(config.build_registry()?);

    info!(
        rules = ?registry.names().collect::<Vec<_>>(),
        excluded_namespaces = ?config.scan.excluded_namespaces,
        interval_secs = config.scan.interval_secs,
        "auditor configured"
    );

    Ok(Scanner::new(
        registry,
        source,
        sink,
        config.scan.filter(),
        config.scan.interval(),
    )
    .with_timestamps(config.scan.include_timestamp))
}

/// Raise `shutdown` once `signal` resolves.
///
/// If the signal cannot be listened for, the error is logged and shutdown is
/// left untouched; the scan loop keeps running. The caller keeps its own
/// handle on the sender, so this task ending never reads as a shutdown.
pub async fn forward_shutdown<F>(signal: F, shutdown: Arc<watch::Sender<bool>>)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("shutdown requested");
            let _ = shutdown.send(true);
        }
        Err(e) => {
            error!(error = %e, "failed to listen for shutdown signal; scanning continues");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::watch;

    use housekeeping_contracts::error::HousekeepingError;
    use housekeeping_rules::HousekeepingConfig;
    use housekeeping_sink::InMemorySink;
    use housekeeping_source::PodListFileSource;

    use super::{build_scanner, forward_shutdown, load_config};

    /// Three pods: one compliant, one in kube-system, one untrusted image
    /// without a team label. Creation times are far in the future relative
    /// to any test clock, so recency always passes.
    const PODS: &str = r#"{"kind":"PodList","items":[
        {"metadata":{"name":"web-0","namespace":"shop","labels":{"team":"x"},
                     "creationTimestamp":"2999-01-01T00:00:00Z"},
         "spec":{"containers":[{"image":"docker.io/bitnami/nginx"}]},
         "status":{"phase":"Running"}},
        {"metadata":{"name":"coredns","namespace":"kube-system","creationTimestamp":"2999-01-01T00:00:00Z"},
         "spec":{"containers":[{"image":"registry.k8s.io/coredns"}]},
         "status":{"phase":"Running"}},
        {"metadata":{"name":"miner","namespace":"shop","creationTimestamp":"2999-01-01T00:00:00Z"},
         "spec":{"containers":[{"image":"evil/cryptominer"}]},
         "status":{"phase":"Running"}}
    ]}"#;

    fn pods_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PODS.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_pipeline_emits_expected_verdicts() {
        let file = pods_file();
        let sink = InMemorySink::new();
        let scanner = build_scanner(
            &HousekeepingConfig::default(),
            Box::new(PodListFileSource::new(file.path())),
            Box::new(sink.clone()),
        )
        .unwrap();

        let summary = scanner.tick().unwrap();
        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.excluded, 1);

        let lines: Vec<String> = sink
            .records()
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                r#"{"pod":"web-0","rule_evaluation":[{"name":"image_prefix","valid":true},{"name":"team_label_present","valid":true},{"name":"recent_start_time","valid":true}]}"#,
                r#"{"pod":"miner","rule_evaluation":[{"name":"image_prefix","valid":false},{"name":"team_label_present","valid":false},{"name":"recent_start_time","valid":true}]}"#,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn scan_loop_recovers_after_source_outage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pods.json");
        let sink = InMemorySink::new();
        let mut config = HousekeepingConfig::default();
        config.scan.interval_secs = 30;
        let scanner = build_scanner(
            &config,
            Box::new(PodListFileSource::new(&path)),
            Box::new(sink.clone()),
        )
        .unwrap();

        let (tx, rx) = watch::channel(false);
        let driver = async {
            // First tick at t=30s finds no file and is abandoned.
            tokio::time::sleep(Duration::from_secs(45)).await;
            assert!(sink.is_empty());
            std::fs::write(&path, PODS).unwrap();
            // Second tick at t=60s succeeds.
            tokio::time::sleep(Duration::from_secs(20)).await;
            tx.send(true).unwrap();
        };
        let (stats, ()) = tokio::join!(scanner.run(rx), driver);

        assert_eq!(stats.ticks_abandoned, 1);
        assert_eq!(stats.ticks_completed, 1);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn load_config_applies_interval_override() {
        let config = load_config(None, Some(5)).unwrap();
        assert_eq!(config.scan.interval_secs, 5);

        match load_config(None, Some(0)) {
            Err(HousekeepingError::ConfigError { reason }) => {
                assert!(reason.contains("interval_secs"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn duplicate_rules_prevent_scanner_construction() {
        let config = HousekeepingConfig::from_toml_str(
            r#"
            [[rules]]
            kind = "recency"

            [[rules]]
            kind = "recency"
            window_secs = 60
            "#,
        )
        .unwrap();

        let result = build_scanner(
            &config,
            Box::new(PodListFileSource::new("/unused")),
            Box::new(InMemorySink::new()),
        );
        assert!(matches!(result, Err(HousekeepingError::ConfigError { .. })));
    }

    #[tokio::test]
    async fn signal_raises_shutdown() {
        let (tx, rx) = watch::channel(false);
        forward_shutdown(async { Ok::<(), io::Error>(()) }, Arc::new(tx)).await;
        assert!(*rx.borrow());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_signal_listener_leaves_scan_loop_running() {
        let file = pods_file();
        let sink = InMemorySink::new();
        let mut config = HousekeepingConfig::default();
        config.scan.interval_secs = 30;
        let scanner = build_scanner(
            &config,
            Box::new(PodListFileSource::new(file.path())),
            Box::new(sink.clone()),
        )
        .unwrap();

        let (tx, rx) = watch::channel(false);
        let tx = Arc::new(tx);
        // The listener gives up and drops its clone of the sender.
        forward_shutdown(
            async { Err::<(), _>(io::Error::new(io::ErrorKind::Other, "no signal driver")) },
            Arc::clone(&tx),
        )
        .await;
        assert!(!*rx.borrow());

        let driver = async {
            tokio::time::sleep(Duration::from_secs(65)).await;
            tx.send(true).unwrap();
        };
        let (stats, ()) = tokio::join!(scanner.run(rx), driver);

        assert_eq!(stats.ticks_completed, 2);
        assert_eq!(sink.len(), 4);
    }
}
