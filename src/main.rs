//! Performance Sentinel binary entry point.
//!
//! Reads JSON-lines observations and shortcut keys from stdin, runs a
//! monitoring session, and prints state transition events to stdout as JSON
//! lines. All logs go to stderr. A final report is exported on shutdown.
//!
//! Coverage is excluded because the main function drives real stdin and
//! signal handling.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::{broadcast, watch};

use perf_sentinel::config::MonitorConfig;
use perf_sentinel::error::AppError;
use perf_sentinel::input::{process_lines, InputEnd};
use perf_sentinel::metrics::ProcessMemorySource;
use perf_sentinel::monitor::PerformanceMonitor;
use perf_sentinel::report::ReportExporter;
use perf_sentinel::service::{MonitorService, Shortcut};
use perf_sentinel::traits::RealTimeProvider;

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    init_tracing();

    tracing::info!("perf-sentinel starting...");

    // Load configuration from environment
    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        refresh_interval_ms = config.refresh_interval_ms,
        check_interval_ms = config.check_interval_ms,
        max_data_points = config.max_data_points,
        report_dir = %config.report_dir.display(),
        "Configuration loaded"
    );

    if let Err(e) = run(config).await {
        tracing::error!("Session error: {e}");
        std::process::exit(1);
    }

    tracing::info!("perf-sentinel shutdown complete");
}

/// Initialize logging to stderr (stdout carries events).
///
/// `LOG_FORMAT=json` switches to structured JSON output.
#[cfg_attr(coverage_nightly, coverage(off))]
fn init_tracing() {
    let filter = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
async fn run(config: MonitorConfig) -> Result<(), AppError> {
    let report_dir = config.report_dir.clone();
    let clock = Arc::new(RealTimeProvider);
    let source = ProcessMemorySource::with_path("/proc/self/statm", clock.clone());
    let monitor = PerformanceMonitor::with_dependencies(config, clock, Box::new(source));

    let (service, handle) = MonitorService::new(monitor);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let service_task = tokio::spawn(service.run(shutdown_rx));
    let printer_task = tokio::spawn(print_events(handle.events()));

    for shortcut in Shortcut::ALL {
        tracing::debug!(shortcut = %shortcut, "Shortcut available");
    }

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        end = process_lines(stdin, &handle, &report_dir) => match end {
            InputEnd::Closed => tracing::info!("Input closed"),
            InputEnd::Failed(e) => tracing::error!(error = %e, "Input read failed"),
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received");
        }
    }

    let report = handle.export_report().await?;
    let path = ReportExporter::write_to_dir(&report, &report_dir)?;
    tracing::info!(path = %path.display(), "Final report written");

    let _ = shutdown_tx.send(true);
    let _ = service_task.await;
    drop(handle);
    let _ = printer_task.await;
    Ok(())
}

/// Print each event as one JSON line on stdout.
#[cfg_attr(coverage_nightly, coverage(off))]
async fn print_events(mut events: broadcast::Receiver<perf_sentinel::monitor::MonitorEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!(error = %e, "Event not serializable"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
