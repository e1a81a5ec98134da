//! Integration tests for Performance Sentinel.
//!
//! These tests drive a running [`MonitorService`] through its handle under
//! tokio's paused clock, so interval ticks fire deterministically.
//!
//! [`MonitorService`]: perf_sentinel::service::MonitorService

mod error_recovery;
mod report_export;
mod service_workflow;
mod shortcut_workflow;

use std::sync::Arc;

use perf_sentinel::config::MonitorConfig;
use perf_sentinel::monitor::PerformanceMonitor;
use perf_sentinel::service::{MonitorHandle, MonitorService};
use perf_sentinel::traits::{ManualTimeProvider, NullSource};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A spawned service plus what a test needs to drive it.
pub struct Harness {
    pub handle: MonitorHandle,
    pub clock: ManualTimeProvider,
    pub shutdown_tx: watch::Sender<bool>,
    pub task: JoinHandle<()>,
}

/// Spawn a service on a manual clock.
pub fn spawn(config: MonitorConfig) -> Harness {
    let clock = ManualTimeProvider::default();
    let monitor = PerformanceMonitor::with_dependencies(
        config,
        Arc::new(clock.clone()),
        Box::new(NullSource),
    );
    let (service, handle) = MonitorService::new(monitor);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(service.run(shutdown_rx));
    Harness {
        handle,
        clock,
        shutdown_tx,
        task,
    }
}
