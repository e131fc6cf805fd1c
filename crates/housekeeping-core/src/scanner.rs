//! The scan loop: periodic fetch → filter → evaluate → emit.
//!
//! The scanner alternates between two states:
//!
//!   Sleeping → Scanning (Fetching → Filtering → Evaluating×N → Emitting×N) → Sleeping …
//!
//! It sleeps the configured interval before every tick, including the first.
//! A tick whose fetch fails is abandoned whole; no verdicts are emitted for it
//! and the loop simply waits for the next tick. A sink failure loses only the
//! one record. The loop ends when the shutdown signal is raised.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, info_span, warn};

use housekeeping_contracts::{
    error::HousekeepingResult,
    verdict::ScanId,
    workload::WorkloadSnapshot,
};

use crate::engine;
use crate::registry::RuleRegistry;
use crate::traits::{StateSource, VerdictSink};

/// Namespaces excluded when no other set is configured.
pub const DEFAULT_EXCLUDED_NAMESPACES: &[&str] = &["kube-system", "housekeeping"];

/// Interval used when no other cadence is configured.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60);

/// Decides which snapshots reach the evaluation engine.
///
/// A snapshot proceeds only if its namespace is not excluded AND its phase is
/// `Running`. The two checks are independent.
#[derive(Debug, Clone)]
pub struct ScanFilter {
    excluded_namespaces: BTreeSet<String>,
}

impl ScanFilter {
    pub fn new<I, S>(excluded_namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_namespaces: excluded_namespaces.into_iter().map(Into::into).collect(),
        }
    }

    /// Return true if `snapshot` should be evaluated.
    pub fn admits(&self, snapshot: &WorkloadSnapshot) -> bool {
        !self.excluded_namespaces.contains(&snapshot.namespace) && snapshot.phase.is_running()
    }

    pub fn excluded_namespaces(&self) -> impl Iterator<Item = &str> {
        self.excluded_namespaces.iter().map(String::as_str)
    }
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_NAMESPACES.iter().copied())
    }
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    pub scan_id: ScanId,
    /// Snapshots returned by the state source.
    pub fetched: usize,
    /// Snapshots dropped by the filter.
    pub excluded: usize,
    /// Records the sink accepted.
    pub emitted: usize,
    /// Records the sink rejected (lost).
    pub sink_failures: usize,
}

/// Cumulative counters across the lifetime of `Scanner::run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Ticks that fetched successfully and ran to completion.
    pub ticks_completed: u64,
    /// Ticks abandoned because the state source failed.
    pub ticks_abandoned: u64,
    pub records_emitted: u64,
    pub sink_failures: u64,
}

/// Drives periodic evaluation over the live workload population.
///
/// One scanner runs one logical scan at a time. The registry is shared
/// read-only; the scanner holds no other state between ticks.
pub struct Scanner {
    registry: Arc<RuleRegistry>,
    source: Box<dyn StateSource>,
    sink: Box<dyn VerdictSink>,
    filter: ScanFilter,
    interval: Duration,
    include_timestamp: bool,
}

impl Scanner {
    pub fn new(
        registry: Arc<RuleRegistry>,
        source: Box<dyn StateSource>,
        sink: Box<dyn VerdictSink>,
        filter: ScanFilter,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            source,
            sink,
            filter,
            interval,
            include_timestamp: false,
        }
    }

    /// Stamp each emitted record with its evaluation instant.
    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one Scanning pass.
    ///
    /// Returns `HousekeepingError::StateSource` if the fetch fails, in which
    /// case nothing was evaluated or emitted. Sink failures are logged and
    /// counted in the summary; they never fail the tick.
    pub fn tick(&self) -> HousekeepingResult<TickSummary> {
        let scan_id = ScanId::new();
        let span = info_span!("scan", scan_id = %scan_id);
        let _guard = span.enter();

        // ── Fetching ─────────────────────────────────────────────────────────
        let snapshots = self.source.list_workloads()?;
        let fetched = snapshots.len();
        debug!(fetched, "workloads fetched");

        let mut summary = TickSummary {
            scan_id,
            fetched,
            excluded: 0,
            emitted: 0,
            sink_failures: 0,
        };

        for snapshot in &snapshots {
            // ── Filtering ────────────────────────────────────────────────────
            if !self.filter.admits(snapshot) {
                debug!(
                    pod = %snapshot.identity,
                    namespace = %snapshot.namespace,
                    phase = %snapshot.phase,
                    "workload excluded from scan"
                );
                summary.excluded += 1;
                continue;
            }

            // ── Evaluating ───────────────────────────────────────────────────
            let now = Utc::now();
            let mut record = engine::evaluate_at(&self.registry, snapshot, now);
            if self.include_timestamp {
                record.evaluated_at = Some(now);
            }

            // ── Emitting ─────────────────────────────────────────────────────
            match self.sink.emit(&record) {
                Ok(()) => summary.emitted += 1,
                Err(e) => {
                    warn!(
                        pod = %snapshot.identity,
                        namespace = %snapshot.namespace,
                        error = %e,
                        "verdict record lost"
                    );
                    summary.sink_failures += 1;
                }
            }
        }

        info!(
            fetched = summary.fetched,
            excluded = summary.excluded,
            emitted = summary.emitted,
            sink_failures = summary.sink_failures,
            "scan complete"
        );

        Ok(summary)
    }

    /// Run the loop until `shutdown` carries `true` or its sender is dropped.
    ///
    /// The signal is observed while sleeping; a tick that has started always
    /// runs to completion. Returns the counters accumulated over the run.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ScanStats {
        let mut stats = ScanStats::default();

        info!(
            interval_secs = self.interval.as_secs_f64(),
            rules = ?self.registry.names().collect::<Vec<_>>(),
            "scan loop started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            // ── Sleeping ─────────────────────────────────────────────────────
            // The deadline is fixed per interval; updates that do not raise
            // shutdown must not push it back.
            let sleep = tokio::time::sleep(self.interval);
            tokio::pin!(sleep);
            let stop = loop {
                tokio::select! {
                    biased;
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break true;
                        }
                    }
                    _ = &mut sleep => break false,
                }
            };
            if stop {
                break;
            }

            // ── Scanning ─────────────────────────────────────────────────────
            match self.tick() {
                Ok(summary) => {
                    stats.ticks_completed += 1;
                    stats.records_emitted += summary.emitted as u64;
                    stats.sink_failures += summary.sink_failures as u64;
                }
                Err(e) => {
                    stats.ticks_abandoned += 1;
                    warn!(error = %e, "scan tick abandoned; waiting for next interval");
                }
            }
        }

        info!(
            ticks_completed = stats.ticks_completed,
            ticks_abandoned = stats.ticks_abandoned,
            records_emitted = stats.records_emitted,
            "scan loop stopped"
        );

        stats
    }
}
