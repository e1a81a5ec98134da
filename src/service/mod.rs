//! Background monitoring service.
//!
//! This module provides the [`MonitorService`] which owns a
//! [`PerformanceMonitor`] inside a single background task, and
//! [`MonitorHandle`] which lets producers and operators talk to it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     MonitorService                          │
//! │  (Background Tokio Task)                                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │  PerformanceMonitor                                   │   │
//! │  │  ├─RollingHistory + HookProfileAggregator             │   │
//! │  │  ├─SummaryCompositor                                  │   │
//! │  │  ├─BaselineManager + RegressionDetector               │   │
//! │  │  └─AlertLedger                                        │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                          ▲                                   │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────┐ ┌────────────┐  │
//! │  │ Refresh    │ │ Check      │ │ Command  │ │ Shutdown   │  │
//! │  │ Interval?  │ │ Interval?  │ │ RX(mpsc) │ │ (watch)    │  │
//! │  └────────────┘ └────────────┘ └──────────┘ └────────────┘  │
//! └──────────────────────────┼───────────────────────────────────┘
//!                            │
//! ┌──────────────────────────┼───────────────────────────────────┐
//! │                     MonitorHandle                            │
//! │  (Clone-able, Send+Sync)                                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  command_tx: mpsc::Sender<MonitorCommand>                    │
//! │  status_rx:  watch::Receiver<ServiceStatus>                  │
//! │  event_tx:   broadcast::Sender<MonitorEvent>                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both intervals exist only while monitoring is active; stopping drops
//! them, which pauses sampling and regression checks together.

mod shortcuts;

pub use shortcuts::{Shortcut, ShortcutOutcome};

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::error::{AppError, BaselineError, ServiceError};
use crate::metrics::Trend;
use crate::monitor::{
    BaselineMetrics, HealthStatus, MonitorEvent, PerformanceMonitor, PerformanceSummary,
    RegressionAlert,
};
use crate::report::PerformanceReport;

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 256;

/// Capacity of the event broadcast channel.
const EVENT_BUFFER: usize = 128;

/// Commands that can be sent to the service.
#[derive(Debug)]
pub enum MonitorCommand {
    /// Append a data point to history.
    RecordSample {
        /// Metric name.
        name: String,
        /// Value.
        value: f64,
    },
    /// Record a render against its budget.
    RecordRender {
        /// Operation name.
        name: String,
        /// Render duration (ms).
        duration_ms: f64,
    },
    /// Capture the current summary as baseline.
    CaptureBaseline {
        /// Channel to send the response.
        response_tx: oneshot::Sender<Result<BaselineMetrics, BaselineError>>,
    },
    /// Drop the baseline.
    ClearBaseline {
        /// Channel to send the response.
        response_tx: oneshot::Sender<bool>,
    },
    /// Start or stop the periodic ticks.
    SetMonitoring {
        /// Desired state.
        enabled: bool,
        /// Channel to send whether the state changed.
        response_tx: oneshot::Sender<bool>,
    },
    /// Flip the periodic ticks.
    ToggleMonitoring {
        /// Channel to send the new state.
        response_tx: oneshot::Sender<bool>,
    },
    /// Flip dashboard visibility.
    ToggleDashboard {
        /// Channel to send the new visibility.
        response_tx: oneshot::Sender<bool>,
    },
    /// Run a regression check immediately.
    CheckNow {
        /// Channel to send the alerts created or refreshed.
        response_tx: oneshot::Sender<Vec<RegressionAlert>>,
    },
    /// Acknowledge one alert.
    AcknowledgeAlert {
        /// Alert id.
        id: String,
        /// Channel to send whether the flag changed.
        response_tx: oneshot::Sender<bool>,
    },
    /// Acknowledge every open alert.
    AcknowledgeAll {
        /// Channel to send how many changed.
        response_tx: oneshot::Sender<usize>,
    },
    /// Remove acknowledged alerts.
    ClearAlerts {
        /// Channel to send how many were removed.
        response_tx: oneshot::Sender<usize>,
    },
    /// Reset history and render profiles.
    ClearMetrics {
        /// Channel to signal completion.
        response_tx: oneshot::Sender<()>,
    },
    /// Read the last composed summary.
    GetSummary {
        /// Channel to send the response.
        response_tx: oneshot::Sender<PerformanceSummary>,
    },
    /// Read all alerts.
    GetAlerts {
        /// Channel to send the response.
        response_tx: oneshot::Sender<Vec<RegressionAlert>>,
    },
    /// Read one metric's trend.
    GetTrend {
        /// Metric name.
        name: String,
        /// Channel to send the response.
        response_tx: oneshot::Sender<Trend>,
    },
    /// Snapshot the session for export.
    ExportReport {
        /// Channel to send the response.
        response_tx: oneshot::Sender<PerformanceReport>,
    },
}

/// Service status published on every state change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    /// Whether the service task is running.
    pub running: bool,
    /// Whether the periodic ticks are active.
    pub monitoring: bool,
    /// Whether the dashboard should be shown.
    pub dashboard_visible: bool,
    /// Health derived from unacknowledged alerts.
    pub health: Option<HealthStatus>,
    /// Whether a baseline is active.
    pub has_baseline: bool,
    /// Open alerts.
    pub unacknowledged_alerts: usize,
    /// Samples observed since the last clear.
    pub total_metrics: u64,
    /// When the summary was last composed.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Handle for interacting with the service.
///
/// This handle is cheap to clone and can be shared across tasks.
#[derive(Clone)]
pub struct MonitorHandle {
    command_tx: mpsc::Sender<MonitorCommand>,
    status_rx: watch::Receiver<ServiceStatus>,
    event_tx: broadcast::Sender<MonitorEvent>,
}

impl MonitorHandle {
    async fn send(&self, command: MonitorCommand) -> Result<(), ServiceError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| ServiceError::NotRunning)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> MonitorCommand + Send,
    ) -> Result<T, ServiceError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(build(response_tx)).await?;
        response_rx.await.map_err(|_| ServiceError::Disconnected)
    }

    /// Append a data point to a metric's history.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotRunning`] if the service has stopped.
    pub async fn record_sample(
        &self,
        name: impl Into<String> + Send,
        value: f64,
    ) -> Result<(), ServiceError> {
        self.send(MonitorCommand::RecordSample {
            name: name.into(),
            value,
        })
        .await
    }

    /// Record one render of a named operation.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotRunning`] if the service has stopped.
    pub async fn record_render(
        &self,
        name: impl Into<String> + Send,
        duration_ms: f64,
    ) -> Result<(), ServiceError> {
        self.send(MonitorCommand::RecordRender {
            name: name.into(),
            duration_ms,
        })
        .await
    }

    /// Capture the current summary as the baseline.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Baseline`] if the capture is rejected, or
    /// [`AppError::Service`] if the service is unreachable.
    pub async fn capture_baseline(&self) -> Result<BaselineMetrics, AppError> {
        let result = self
            .request(|response_tx| MonitorCommand::CaptureBaseline { response_tx })
            .await?;
        Ok(result?)
    }

    /// Drop the baseline; returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn clear_baseline(&self) -> Result<bool, ServiceError> {
        self.request(|response_tx| MonitorCommand::ClearBaseline { response_tx })
            .await
    }

    /// Resume the periodic ticks; returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn start_monitoring(&self) -> Result<bool, ServiceError> {
        self.request(|response_tx| MonitorCommand::SetMonitoring {
            enabled: true,
            response_tx,
        })
        .await
    }

    /// Pause the periodic ticks; returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn stop_monitoring(&self) -> Result<bool, ServiceError> {
        self.request(|response_tx| MonitorCommand::SetMonitoring {
            enabled: false,
            response_tx,
        })
        .await
    }

    /// Flip the periodic ticks; returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn toggle_monitoring(&self) -> Result<bool, ServiceError> {
        self.request(|response_tx| MonitorCommand::ToggleMonitoring { response_tx })
            .await
    }

    /// Flip dashboard visibility; returns the new visibility.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn toggle_dashboard(&self) -> Result<bool, ServiceError> {
        self.request(|response_tx| MonitorCommand::ToggleDashboard { response_tx })
            .await
    }

    /// Run a regression check now, outside the check cadence.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn check_now(&self) -> Result<Vec<RegressionAlert>, ServiceError> {
        self.request(|response_tx| MonitorCommand::CheckNow { response_tx })
            .await
    }

    /// Acknowledge one alert; returns whether its flag changed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn acknowledge_alert(
        &self,
        id: impl Into<String> + Send,
    ) -> Result<bool, ServiceError> {
        let id = id.into();
        self.request(|response_tx| MonitorCommand::AcknowledgeAlert { id, response_tx })
            .await
    }

    /// Acknowledge every open alert; returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn acknowledge_all_alerts(&self) -> Result<usize, ServiceError> {
        self.request(|response_tx| MonitorCommand::AcknowledgeAll { response_tx })
            .await
    }

    /// Remove acknowledged alerts; returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn clear_alerts(&self) -> Result<usize, ServiceError> {
        self.request(|response_tx| MonitorCommand::ClearAlerts { response_tx })
            .await
    }

    /// Reset history and render profiles.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn clear_metrics(&self) -> Result<(), ServiceError> {
        self.request(|response_tx| MonitorCommand::ClearMetrics { response_tx })
            .await
    }

    /// Last composed summary.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn summary(&self) -> Result<PerformanceSummary, ServiceError> {
        self.request(|response_tx| MonitorCommand::GetSummary { response_tx })
            .await
    }

    /// All alerts in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn alerts(&self) -> Result<Vec<RegressionAlert>, ServiceError> {
        self.request(|response_tx| MonitorCommand::GetAlerts { response_tx })
            .await
    }

    /// Trend of one metric.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn trend(&self, name: impl Into<String> + Send) -> Result<Trend, ServiceError> {
        let name = name.into();
        self.request(|response_tx| MonitorCommand::GetTrend { name, response_tx })
            .await
    }

    /// Snapshot the session for export.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the service is unreachable.
    pub async fn export_report(&self) -> Result<PerformanceReport, ServiceError> {
        self.request(|response_tx| MonitorCommand::ExportReport { response_tx })
            .await
    }

    /// Latest published status.
    #[must_use]
    pub fn status(&self) -> ServiceStatus {
        self.status_rx.borrow().clone()
    }

    /// Subscribe to status updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ServiceStatus> {
        self.status_rx.clone()
    }

    /// Subscribe to state transition events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Create a dummy handle for testing.
    ///
    /// This creates a handle that is not connected to any service.
    /// All commands will fail with [`ServiceError::NotRunning`].
    #[must_use]
    pub fn for_testing() -> Self {
        let (command_tx, _command_rx) = mpsc::channel(1);
        let (status_tx, status_rx) = watch::channel(ServiceStatus::default());
        let (event_tx, _event_rx) = broadcast::channel(1);
        // Drop the sender so status never changes
        drop(status_tx);
        Self {
            command_tx,
            status_rx,
            event_tx,
        }
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("status", &*self.status_rx.borrow())
            .finish_non_exhaustive()
    }
}

/// The monitoring service.
///
/// Runs as a background task and is the sole owner of its
/// [`PerformanceMonitor`].
pub struct MonitorService {
    monitor: PerformanceMonitor,
    command_rx: mpsc::Receiver<MonitorCommand>,
    status_tx: watch::Sender<ServiceStatus>,
    event_tx: broadcast::Sender<MonitorEvent>,
    refresh: Option<Interval>,
    check: Option<Interval>,
    dashboard_visible: bool,
    running: bool,
}

impl MonitorService {
    /// Create a service and its handle.
    ///
    /// Returns the service (to be run as a background task) and a handle
    /// for interacting with it.
    #[must_use]
    pub fn new(monitor: PerformanceMonitor) -> (Self, MonitorHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _event_rx) = broadcast::channel(EVENT_BUFFER);
        let (status_tx, status_rx) = watch::channel(ServiceStatus::default());

        let mut service = Self {
            monitor,
            command_rx,
            status_tx,
            event_tx: event_tx.clone(),
            refresh: None,
            check: None,
            dashboard_visible: false,
            running: true,
        };
        service.update_status();

        let handle = MonitorHandle {
            command_tx,
            status_rx,
            event_tx,
        };

        (service, handle)
    }

    /// Run the service loop.
    ///
    /// Runs until the shutdown signal is received, the shutdown sender is
    /// dropped, or every handle is dropped.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        if self.monitor.is_monitoring() {
            self.arm_timers();
        }

        tracing::info!(
            refresh_interval_ms = self.monitor.config().refresh_interval_ms,
            check_interval_ms = self.monitor.config().check_interval_ms,
            monitoring = self.monitor.is_monitoring(),
            "Monitor service started"
        );
        self.publish();

        loop {
            tokio::select! {
                () = next_tick(&mut self.refresh) => {
                    self.monitor.sample_tick();
                    self.publish();
                }
                () = next_tick(&mut self.check) => {
                    self.monitor.run_regression_check();
                    self.publish();
                }
                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        tracing::info!("All monitor handles dropped");
                        break;
                    };
                    self.handle_command(command);
                    self.publish();
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        tracing::info!("Monitor service shutting down");
                        break;
                    }
                }
            }
        }

        self.disarm_timers();
        self.running = false;
        self.publish();
    }

    fn handle_command(&mut self, command: MonitorCommand) {
        match command {
            MonitorCommand::RecordSample { name, value } => {
                self.monitor.add_data_point(&name, value);
            }
            MonitorCommand::RecordRender { name, duration_ms } => {
                self.monitor.record_render(&name, duration_ms);
            }
            MonitorCommand::CaptureBaseline { response_tx } => {
                let _ = response_tx.send(self.monitor.capture_baseline());
            }
            MonitorCommand::ClearBaseline { response_tx } => {
                let _ = response_tx.send(self.monitor.clear_baseline());
            }
            MonitorCommand::SetMonitoring {
                enabled,
                response_tx,
            } => {
                let _ = response_tx.send(self.set_monitoring(enabled));
            }
            MonitorCommand::ToggleMonitoring { response_tx } => {
                let enabled = !self.monitor.is_monitoring();
                self.set_monitoring(enabled);
                let _ = response_tx.send(enabled);
            }
            MonitorCommand::ToggleDashboard { response_tx } => {
                self.dashboard_visible = !self.dashboard_visible;
                tracing::debug!(visible = self.dashboard_visible, "Dashboard toggled");
                let _ = response_tx.send(self.dashboard_visible);
            }
            MonitorCommand::CheckNow { response_tx } => {
                let _ = response_tx.send(self.monitor.run_regression_check());
            }
            MonitorCommand::AcknowledgeAlert { id, response_tx } => {
                let _ = response_tx.send(self.monitor.acknowledge_alert(&id));
            }
            MonitorCommand::AcknowledgeAll { response_tx } => {
                let _ = response_tx.send(self.monitor.acknowledge_all_alerts());
            }
            MonitorCommand::ClearAlerts { response_tx } => {
                let _ = response_tx.send(self.monitor.clear_alerts());
            }
            MonitorCommand::ClearMetrics { response_tx } => {
                self.monitor.clear_metrics();
                let _ = response_tx.send(());
            }
            MonitorCommand::GetSummary { response_tx } => {
                let _ = response_tx.send(self.monitor.summary().clone());
            }
            MonitorCommand::GetAlerts { response_tx } => {
                let _ = response_tx.send(self.monitor.alerts().to_vec());
            }
            MonitorCommand::GetTrend { name, response_tx } => {
                let _ = response_tx.send(self.monitor.trend(&name));
            }
            MonitorCommand::ExportReport { response_tx } => {
                let _ = response_tx.send(self.monitor.export_report());
            }
        }
    }

    fn set_monitoring(&mut self, enabled: bool) -> bool {
        if enabled {
            let changed = self.monitor.start_monitoring();
            if changed {
                self.arm_timers();
            }
            changed
        } else {
            let changed = self.monitor.stop_monitoring();
            if changed {
                self.disarm_timers();
            }
            changed
        }
    }

    fn arm_timers(&mut self) {
        let config = self.monitor.config();
        self.refresh = Some(periodic(config.refresh_interval()));
        self.check = Some(periodic(config.check_interval()));
    }

    fn disarm_timers(&mut self) {
        self.refresh = None;
        self.check = None;
    }

    fn build_status(&self) -> ServiceStatus {
        let summary = self.monitor.summary();
        ServiceStatus {
            running: self.running,
            monitoring: self.monitor.is_monitoring(),
            dashboard_visible: self.dashboard_visible,
            health: Some(self.monitor.status()),
            has_baseline: self.monitor.baseline().is_some(),
            unacknowledged_alerts: self
                .monitor
                .alerts()
                .iter()
                .filter(|alert| !alert.acknowledged)
                .count(),
            total_metrics: summary.total_metrics,
            last_updated: Some(summary.last_updated),
        }
    }

    fn update_status(&self) {
        let status = self.build_status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    /// Broadcast pending events and refresh the published status.
    fn publish(&mut self) {
        for event in self.monitor.drain_events() {
            // No subscribers is fine
            let _ = self.event_tx.send(event);
        }
        self.update_status();
    }
}

/// An interval whose first tick is one period from now.
fn periodic(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Wait for the next tick, or forever if the timer is disarmed.
async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
