//! Point-in-time performance summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{names, BudgetViolation, HookMetrics, HookProfileAggregator, RollingHistory};

/// Page-load experience metrics (latest observed values, ms).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebVitals {
    /// Page load time.
    pub page_load: Option<f64>,
    /// First contentful paint.
    pub fcp: Option<f64>,
    /// Time to interactive.
    pub tti: Option<f64>,
}

/// A consistent snapshot of everything the monitor knows.
///
/// Always rebuilt wholesale by [`SummaryCompositor::compose`]; consumers
/// never observe a half-updated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    /// Page-load metrics.
    pub web_vitals: WebVitals,
    /// Mean interaction latency over the history window (ms).
    pub avg_interaction_time: Option<f64>,
    /// Render-count-weighted mean render time across operations (ms).
    pub avg_render_time: Option<f64>,
    /// Latest memory reading (MB); absent when the signal is unsupported.
    pub memory_usage: Option<f64>,
    /// Per-operation render statistics.
    pub hook_metrics: Vec<HookMetrics>,
    /// Most recent budget violations, oldest first.
    pub budget_violations: Vec<BudgetViolation>,
    /// Samples observed since the last clear.
    pub total_metrics: u64,
    /// When this summary was composed.
    pub last_updated: DateTime<Utc>,
}

impl PerformanceSummary {
    /// A summary with no data.
    #[must_use]
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            web_vitals: WebVitals::default(),
            avg_interaction_time: None,
            avg_render_time: None,
            memory_usage: None,
            hook_metrics: Vec::new(),
            budget_violations: Vec::new(),
            total_metrics: 0,
            last_updated: now,
        }
    }
}

/// Builds [`PerformanceSummary`] values from history and profiler state.
#[derive(Debug, Clone, Copy)]
pub struct SummaryCompositor {
    violation_limit: usize,
}

impl SummaryCompositor {
    /// Create a compositor showing at most `violation_limit` violations.
    #[must_use]
    pub const fn new(violation_limit: usize) -> Self {
        Self { violation_limit }
    }

    /// Compose a summary. Pure: identical inputs yield identical output
    /// apart from `last_updated`.
    #[must_use]
    pub fn compose(
        &self,
        history: &RollingHistory,
        profiler: &HookProfileAggregator,
        total_metrics: u64,
        now: DateTime<Utc>,
    ) -> PerformanceSummary {
        PerformanceSummary {
            web_vitals: WebVitals {
                page_load: history.latest(names::PAGE_LOAD),
                fcp: history.latest(names::FCP),
                tti: history.latest(names::TTI),
            },
            avg_interaction_time: history.mean(names::INTERACTION),
            avg_render_time: profiler.avg_render_time(),
            memory_usage: history.latest(names::MEMORY),
            hook_metrics: profiler.hook_metrics(),
            budget_violations: profiler.recent_violations(self.violation_limit),
            total_metrics,
            last_updated: now,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn fixtures() -> (RollingHistory, HookProfileAggregator) {
        let now = Utc::now();
        let mut history = RollingHistory::new(10);
        history.add_data_point(names::FCP, 900.0);
        history.add_data_point(names::FCP, 1100.0);
        history.add_data_point(names::TTI, 2400.0);
        history.add_data_point(names::INTERACTION, 40.0);
        history.add_data_point(names::INTERACTION, 60.0);

        let mut profiler = HookProfileAggregator::new(10);
        profiler.record("Table", 12.0, 16.0, now);
        profiler.record("Table", 24.0, 16.0, now);
        (history, profiler)
    }

    #[test]
    fn test_compose_reads_latest_and_means() {
        let (history, profiler) = fixtures();
        let summary = SummaryCompositor::new(5).compose(&history, &profiler, 7, Utc::now());

        assert_eq!(summary.web_vitals.fcp, Some(1100.0));
        assert_eq!(summary.web_vitals.tti, Some(2400.0));
        assert_eq!(summary.web_vitals.page_load, None);
        assert_eq!(summary.avg_interaction_time, Some(50.0));
        assert_eq!(summary.avg_render_time, Some(18.0));
        assert_eq!(summary.memory_usage, None);
        assert_eq!(summary.hook_metrics.len(), 1);
        assert_eq!(summary.budget_violations.len(), 1);
        assert_eq!(summary.total_metrics, 7);
    }

    #[test]
    fn test_compose_is_idempotent_except_timestamp() {
        let (history, profiler) = fixtures();
        let compositor = SummaryCompositor::new(5);
        let t0 = Utc::now();
        let first = compositor.compose(&history, &profiler, 7, t0);
        let mut second = compositor.compose(&history, &profiler, 7, t0 + Duration::seconds(1));

        assert_ne!(first.last_updated, second.last_updated);
        second.last_updated = first.last_updated;
        assert_eq!(first, second);
    }

    #[test]
    fn test_violation_limit_applies() {
        let now = Utc::now();
        let history = RollingHistory::new(10);
        let mut profiler = HookProfileAggregator::new(50);
        for _ in 0..8 {
            profiler.record("Slow", 40.0, 16.0, now);
        }
        let summary = SummaryCompositor::new(3).compose(&history, &profiler, 8, now);
        assert_eq!(summary.budget_violations.len(), 3);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = PerformanceSummary::empty(Utc::now());
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("webVitals").is_some());
        assert!(json.get("avgInteractionTime").is_some());
        assert!(json.get("totalMetrics").is_some());
        assert!(json.get("lastUpdated").is_some());
    }
}
