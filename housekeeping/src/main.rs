//! Housekeeping auditor CLI.
//!
//! Periodically lists the pods in a cluster, evaluates each one against the
//! configured compliance rules, and prints one JSON verdict per pod to stdout.
//! Logs go to stderr so the verdict stream stays machine-readable.
//!
//! Usage:
//!   housekeeping                              # kubectl source, 60s interval
//!   housekeeping --config housekeeping.toml
//!   housekeeping --pods-file pods.json --once

mod app;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use housekeeping_core::traits::StateSource;
use housekeeping_sink::JsonLinesSink;
use housekeeping_source::{KubectlSource, PodListFileSource};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Periodic compliance audit of running Kubernetes workloads.
#[derive(Parser)]
#[command(
    name = "housekeeping",
    about = "Audit running pods against compliance rules",
    long_about = "Lists pods on a fixed interval, evaluates every rule against every pod\n\
                  outside the excluded namespaces, and writes one JSON verdict per pod\n\
                  to stdout."
)]
struct Cli {
    /// TOML configuration file. Built-in defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Read pods from a PodList JSON file instead of running kubectl.
    #[arg(long, value_name = "PATH")]
    pods_file: Option<PathBuf>,

    /// Override the scan interval from the configuration.
    #[arg(long, value_name = "SECS")]
    interval_secs: Option<u64>,

    /// Run a single scan and exit.
    #[arg(long)]
    once: bool,

    /// Log output format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Compact,
    Json,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG overrides the default level, e.g. RUST_LOG=debug.
    init_logging(cli.log_format);

    let config = match app::load_config(cli.config.as_deref(), cli.interval_secs) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("housekeeping: {}", e);
            std::process::exit(1);
        }
    };

    let source: Box<dyn StateSource> = match &cli.pods_file {
        Some(path) => Box::new(PodListFileSource::new(path)),
        None => Box::new(KubectlSource::new()),
    };

    let scanner = match app::build_scanner(&config, source, Box::new(JsonLinesSink::stdout())) {
        Ok(scanner) => scanner,
        Err(e) => {
            eprintln!("housekeeping: {}", e);
            std::process::exit(1);
        }
    };

    if cli.once {
        if let Err(e) = scanner.tick() {
            error!(error = %e, "scan failed");
            std::process::exit(1);
        }
        return;
    }

    // `main` keeps a handle on the sender so the loop outlives the signal
    // task even if that task ends without raising shutdown.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);
    tokio::spawn(app::forward_shutdown(
        tokio::signal::ctrl_c(),
        Arc::clone(&shutdown_tx),
    ));

    let stats = scanner.run(shutdown_rx).await;
    drop(shutdown_tx);
    info!(
        ticks_completed = stats.ticks_completed,
        ticks_abandoned = stats.ticks_abandoned,
        records_emitted = stats.records_emitted,
        "housekeeping stopped"
    );
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}
