//! The monitoring session engine.
//!
//! [`PerformanceMonitor`] owns every piece of session state: history, render
//! profiles, the current summary, the baseline and the alert ledger. It is
//! synchronous and clock-injected; scheduling lives in [`crate::service`].
//!
//! # Example
//!
//! ```
//! use perf_sentinel::config::MonitorConfig;
//! use perf_sentinel::monitor::{HealthStatus, PerformanceMonitor};
//!
//! let mut monitor = PerformanceMonitor::new(MonitorConfig::default());
//! monitor.record_render("Table", 8.0);
//! monitor.capture_baseline().unwrap();
//!
//! monitor.record_render("Table", 24.0);
//! monitor.refresh_summary();
//! let raised = monitor.run_regression_check();
//!
//! assert_eq!(raised.len(), 1);
//! assert_eq!(monitor.status(), HealthStatus::Critical);
//! ```

mod alerts;
mod baseline;
mod regression;
mod summary;

pub use alerts::{AlertLedger, AlertOutcome, RegressionAlert};
pub use baseline::{BaselineManager, BaselineMetrics};
pub use regression::{
    degradation, HealthStatus, MetricDirection, RegressionDetector, RegressionFinding,
    RegressionMetric, RegressionState, Severity,
};
pub use summary::{PerformanceSummary, SummaryCompositor, WebVitals};

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;

use crate::config::MonitorConfig;
use crate::error::BaselineError;
use crate::metrics::{
    BudgetViolation, HookProfileAggregator, MetricSample, RollingHistory, Trend,
};
use crate::report::PerformanceReport;
use crate::traits::{MetricSource, NullSource, RealTimeProvider, TimeProvider};

/// State transitions observable by subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// Sampling and regression checks resumed.
    MonitoringStarted,
    /// Sampling and regression checks paused.
    MonitoringStopped,
    /// A new baseline became active.
    BaselineCaptured {
        /// The captured baseline.
        baseline: BaselineMetrics,
    },
    /// The baseline was cleared.
    BaselineCleared,
    /// A new alert was created.
    AlertRaised {
        /// The alert.
        alert: RegressionAlert,
    },
    /// An open alert was refreshed by a later check.
    AlertUpdated {
        /// The alert after the update.
        alert: RegressionAlert,
    },
    /// Alerts were acknowledged.
    AlertsAcknowledged {
        /// Ids whose flag changed.
        ids: Vec<String>,
    },
    /// Acknowledged alerts were removed.
    AlertsCleared {
        /// How many were removed.
        removed: usize,
    },
    /// A render exceeded its budget.
    BudgetExceeded {
        /// The violation.
        violation: BudgetViolation,
    },
    /// History and render profiles were reset.
    MetricsCleared,
}

/// A single monitoring session.
pub struct PerformanceMonitor {
    config: MonitorConfig,
    clock: Arc<dyn TimeProvider>,
    source: Box<dyn MetricSource>,
    history: RollingHistory,
    profiler: HookProfileAggregator,
    compositor: SummaryCompositor,
    baselines: BaselineManager,
    detector: RegressionDetector,
    ledger: AlertLedger,
    summary: PerformanceSummary,
    total_metrics: u64,
    monitoring: bool,
    events: VecDeque<MonitorEvent>,
    dropped_events: u64,
}

impl PerformanceMonitor {
    /// Session using the system clock and no sample source.
    #[must_use]
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_dependencies(config, Arc::new(RealTimeProvider), Box::new(NullSource))
    }

    /// Session with an injected clock and sample source.
    #[must_use]
    pub fn with_dependencies(
        config: MonitorConfig,
        clock: Arc<dyn TimeProvider>,
        source: Box<dyn MetricSource>,
    ) -> Self {
        let now = clock.now();
        Self {
            history: RollingHistory::new(config.max_data_points),
            profiler: HookProfileAggregator::new(config.max_violations),
            compositor: SummaryCompositor::new(config.summary_violation_limit),
            baselines: BaselineManager::new(config.min_baseline_samples),
            detector: RegressionDetector::new(config.warning_threshold, config.critical_threshold),
            ledger: AlertLedger::new(),
            summary: PerformanceSummary::empty(now),
            total_metrics: 0,
            monitoring: config.auto_start,
            events: VecDeque::with_capacity(config.max_pending_events.min(64)),
            dropped_events: 0,
            config,
            clock,
            source,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // ========================================================================
    // Sample intake
    // ========================================================================

    /// Append a value to a metric's history. Non-finite values are dropped.
    pub fn add_data_point(&mut self, name: &str, value: f64) {
        if !value.is_finite() {
            tracing::debug!(metric = name, value, "Dropping non-finite data point");
            return;
        }
        self.history.add_data_point(name, value);
        self.total_metrics += 1;
    }

    /// Append a normalized sample to history.
    pub fn record_sample(&mut self, sample: &MetricSample) {
        self.add_data_point(&sample.name, sample.value);
    }

    /// Record one render of a named operation against its budget.
    ///
    /// Returns the budget violation, if the render produced one.
    pub fn record_render(&mut self, name: &str, duration_ms: f64) -> Option<BudgetViolation> {
        if !duration_ms.is_finite() {
            tracing::debug!(operation = name, "Dropping non-finite render duration");
            return None;
        }
        let budget = self.config.budget_for(name);
        let violation = self
            .profiler
            .record(name, duration_ms.max(0.0), budget, self.clock.now());
        self.total_metrics += 1;

        if let Some(violation) = &violation {
            tracing::debug!(
                operation = name,
                duration_ms,
                budget_ms = budget,
                exceeded_ms = violation.exceeded,
                "Render budget exceeded"
            );
            self.emit(MonitorEvent::BudgetExceeded {
                violation: violation.clone(),
            });
        }
        violation
    }

    // ========================================================================
    // Summary
    // ========================================================================

    /// One refresh tick: poll the source, then recompose the summary.
    ///
    /// Does nothing while monitoring is stopped; returns whether it ran.
    pub fn sample_tick(&mut self) -> bool {
        if !self.monitoring {
            return false;
        }
        for sample in self.source.poll() {
            self.record_sample(&sample);
        }
        self.refresh_summary();
        true
    }

    /// Recompose the summary from current state.
    pub fn refresh_summary(&mut self) -> &PerformanceSummary {
        self.summary = self.compositor.compose(
            &self.history,
            &self.profiler,
            self.total_metrics,
            self.clock.now(),
        );
        &self.summary
    }

    /// Last composed summary.
    #[must_use]
    pub const fn summary(&self) -> &PerformanceSummary {
        &self.summary
    }

    // ========================================================================
    // Monitoring lifecycle
    // ========================================================================

    /// Resume sampling and regression checks. Returns `false` if already running.
    pub fn start_monitoring(&mut self) -> bool {
        if self.monitoring {
            return false;
        }
        self.monitoring = true;
        tracing::info!("Performance monitoring started");
        self.emit(MonitorEvent::MonitoringStarted);
        true
    }

    /// Pause sampling and regression checks. Data is kept. Returns `false` if
    /// already stopped.
    pub fn stop_monitoring(&mut self) -> bool {
        if !self.monitoring {
            return false;
        }
        self.monitoring = false;
        tracing::info!("Performance monitoring stopped");
        self.emit(MonitorEvent::MonitoringStopped);
        true
    }

    /// Whether the periodic ticks are active.
    #[must_use]
    pub const fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    // ========================================================================
    // Baseline
    // ========================================================================

    /// Capture the current summary as the baseline.
    ///
    /// The summary is recomposed first so the baseline reflects every sample
    /// recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError::InsufficientSamples`] when too few samples
    /// have been observed; the previous baseline stays active.
    pub fn capture_baseline(&mut self) -> Result<BaselineMetrics, BaselineError> {
        self.refresh_summary();
        let now = self.clock.now();
        match self.baselines.capture(&self.summary, now) {
            Ok(baseline) => {
                let baseline = baseline.clone();
                tracing::info!(
                    sample_count = baseline.sample_count,
                    avg_render_time = ?baseline.avg_render_time,
                    fcp = ?baseline.fcp,
                    tti = ?baseline.tti,
                    memory_mb = ?baseline.memory_usage,
                    "Baseline captured"
                );
                self.emit(MonitorEvent::BaselineCaptured {
                    baseline: baseline.clone(),
                });
                Ok(baseline)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Baseline capture rejected");
                Err(e)
            }
        }
    }

    /// Drop the baseline. Existing alerts remain. Returns whether one existed.
    pub fn clear_baseline(&mut self) -> bool {
        let cleared = self.baselines.clear();
        if cleared {
            tracing::info!("Baseline cleared");
            self.emit(MonitorEvent::BaselineCleared);
        }
        cleared
    }

    /// Active baseline.
    #[must_use]
    pub const fn baseline(&self) -> Option<&BaselineMetrics> {
        self.baselines.current()
    }

    // ========================================================================
    // Regression detection
    // ========================================================================

    /// One check tick: compare the last summary against the baseline.
    ///
    /// Skipped while monitoring is stopped or no baseline is active. Returns
    /// the alerts created or refreshed by this check.
    pub fn run_regression_check(&mut self) -> Vec<RegressionAlert> {
        if !self.monitoring {
            return Vec::new();
        }
        let Some(baseline) = self.baselines.current() else {
            return Vec::new();
        };

        let findings = self.detector.check(baseline, &self.summary);
        let now = self.clock.now();
        let mut changed = Vec::with_capacity(findings.len());

        for finding in findings {
            match self.ledger.raise(finding, now) {
                AlertOutcome::Created(alert) => {
                    tracing::warn!(
                        alert_id = %alert.id,
                        metric = %alert.metric,
                        severity = %alert.severity,
                        baseline = alert.baseline,
                        current = alert.current,
                        degradation = alert.degradation,
                        "Performance regression detected"
                    );
                    self.emit(MonitorEvent::AlertRaised {
                        alert: alert.clone(),
                    });
                    changed.push(alert);
                }
                AlertOutcome::Refreshed(alert) => {
                    tracing::debug!(
                        alert_id = %alert.id,
                        metric = %alert.metric,
                        degradation = alert.degradation,
                        "Regression alert refreshed"
                    );
                    self.emit(MonitorEvent::AlertUpdated {
                        alert: alert.clone(),
                    });
                    changed.push(alert);
                }
                AlertOutcome::Suppressed => {}
            }
        }
        changed
    }

    /// Health derived from unacknowledged alerts.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        self.ledger.status()
    }

    /// Detector state.
    #[must_use]
    pub fn state(&self) -> RegressionState {
        if self.baselines.is_set() {
            RegressionState::Monitoring(self.status())
        } else {
            RegressionState::NoBaseline
        }
    }

    // ========================================================================
    // Alerts
    // ========================================================================

    /// Acknowledge one alert. Unknown or already acknowledged ids are no-ops.
    pub fn acknowledge_alert(&mut self, id: &str) -> bool {
        let changed = self.ledger.acknowledge(id);
        if changed {
            tracing::info!(alert_id = id, "Alert acknowledged");
            self.emit(MonitorEvent::AlertsAcknowledged {
                ids: vec![id.to_string()],
            });
        }
        changed
    }

    /// Acknowledge every open alert; returns how many changed.
    pub fn acknowledge_all_alerts(&mut self) -> usize {
        let ids: Vec<String> = self
            .ledger
            .unacknowledged()
            .map(|alert| alert.id.clone())
            .collect();
        let count = self.ledger.acknowledge_all();
        if count > 0 {
            tracing::info!(count, "All alerts acknowledged");
            self.emit(MonitorEvent::AlertsAcknowledged { ids });
        }
        count
    }

    /// Remove acknowledged alerts; returns how many were removed.
    pub fn clear_alerts(&mut self) -> usize {
        let removed = self.ledger.clear();
        if removed > 0 {
            tracing::info!(removed, "Acknowledged alerts cleared");
            self.emit(MonitorEvent::AlertsCleared { removed });
        }
        removed
    }

    /// All alerts in creation order.
    #[must_use]
    pub fn alerts(&self) -> &[RegressionAlert] {
        self.ledger.alerts()
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Reset history and render profiles, then recompose the summary.
    ///
    /// Baseline and alerts are untouched.
    pub fn clear_metrics(&mut self) {
        self.history.clear();
        self.profiler.clear();
        self.total_metrics = 0;
        self.refresh_summary();
        tracing::info!("Metrics cleared");
        self.emit(MonitorEvent::MetricsCleared);
    }

    /// Trend of one metric.
    #[must_use]
    pub fn trend(&self, name: &str) -> Trend {
        self.history.trend(name)
    }

    /// Raw history.
    #[must_use]
    pub const fn history(&self) -> &RollingHistory {
        &self.history
    }

    /// Render profiles.
    #[must_use]
    pub const fn profiler(&self) -> &HookProfileAggregator {
        &self.profiler
    }

    // ========================================================================
    // Export and events
    // ========================================================================

    /// Snapshot the session for export.
    #[must_use]
    pub fn export_report(&self) -> PerformanceReport {
        let trends: BTreeMap<String, Trend> = self
            .history
            .metric_names()
            .into_iter()
            .map(|name| {
                let trend = self.history.trend(&name);
                (name, trend)
            })
            .collect();

        PerformanceReport {
            exported_at: self.clock.now(),
            status: self.status(),
            summary: self.summary.clone(),
            history: self.history.snapshot(),
            trends,
            alerts: self.ledger.alerts().to_vec(),
            baseline: self.baselines.current().cloned(),
        }
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<MonitorEvent> {
        self.events.drain(..).collect()
    }

    /// Undrained events.
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Events discarded because nobody drained the queue in time.
    #[must_use]
    pub const fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    fn emit(&mut self, event: MonitorEvent) {
        if self.events.len() >= self.config.max_pending_events {
            self.events.pop_front();
            self.dropped_events += 1;
            if self.dropped_events == 1 {
                tracing::debug!(
                    capacity = self.config.max_pending_events,
                    "Event queue full, dropping oldest events"
                );
            }
        }
        self.events.push_back(event);
    }
}

impl std::fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("monitoring", &self.monitoring)
            .field("total_metrics", &self.total_metrics)
            .field("baseline", &self.baselines.current())
            .field("alerts", &self.ledger.len())
            .finish_non_exhaustive()
    }
}
