//! Per-operation render profiling and budget violations.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Render statistics for one named operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookMetrics {
    /// Operation name.
    pub name: String,
    /// Running mean of render durations (ms).
    pub avg_render_time: f64,
    /// Number of renders observed.
    pub total_renders: u64,
    /// Renders that exceeded the budget.
    pub violations: u64,
    /// Duration of the most recent render (ms).
    pub last_render_time: f64,
    /// Slowest render observed (ms).
    pub max_render_time: f64,
}

impl HookMetrics {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            avg_render_time: 0.0,
            total_renders: 0,
            violations: 0,
            last_render_time: 0.0,
            max_render_time: 0.0,
        }
    }
}

/// A render that exceeded its budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetViolation {
    /// Operation statistics as of the offending render.
    pub metric: HookMetrics,
    /// Milliseconds over budget.
    pub exceeded: f64,
    /// Budget that applied (ms).
    pub budget: f64,
    /// When the render was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Accumulates render statistics per operation.
///
/// Budgets are resolved by the caller and passed into [`record`], so the
/// aggregator itself holds no threshold policy.
///
/// [`record`]: HookProfileAggregator::record
#[derive(Debug, Clone)]
pub struct HookProfileAggregator {
    hooks: HashMap<String, HookMetrics>,
    violations: VecDeque<BudgetViolation>,
    max_violations: usize,
}

impl HookProfileAggregator {
    /// Create an aggregator retaining at most `max_violations` violations.
    #[must_use]
    pub fn new(max_violations: usize) -> Self {
        Self {
            hooks: HashMap::new(),
            violations: VecDeque::with_capacity(max_violations),
            max_violations: max_violations.max(1),
        }
    }

    /// Record one render; returns the violation it produced, if any.
    #[allow(clippy::cast_precision_loss)]
    pub fn record(
        &mut self,
        name: &str,
        duration_ms: f64,
        budget_ms: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<BudgetViolation> {
        let hook = self
            .hooks
            .entry(name.to_string())
            .or_insert_with(|| HookMetrics::new(name));

        hook.total_renders += 1;
        hook.avg_render_time += (duration_ms - hook.avg_render_time) / hook.total_renders as f64;
        hook.last_render_time = duration_ms;
        hook.max_render_time = hook.max_render_time.max(duration_ms);

        if duration_ms <= budget_ms {
            return None;
        }

        hook.violations += 1;
        let violation = BudgetViolation {
            metric: hook.clone(),
            exceeded: duration_ms - budget_ms,
            budget: budget_ms,
            timestamp,
        };

        if self.violations.len() >= self.max_violations {
            self.violations.pop_front();
        }
        self.violations.push_back(violation.clone());
        Some(violation)
    }

    /// Statistics for one operation.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HookMetrics> {
        self.hooks.get(name)
    }

    /// Statistics for every operation, sorted by name.
    #[must_use]
    pub fn hook_metrics(&self) -> Vec<HookMetrics> {
        let mut hooks: Vec<HookMetrics> = self.hooks.values().cloned().collect();
        hooks.sort_by(|a, b| a.name.cmp(&b.name));
        hooks
    }

    /// Render-count-weighted mean across all operations.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_render_time(&self) -> Option<f64> {
        let renders = self.total_renders();
        if renders == 0 {
            return None;
        }
        let weighted: f64 = self
            .hooks
            .values()
            .map(|h| h.avg_render_time * h.total_renders as f64)
            .sum();
        Some(weighted / renders as f64)
    }

    /// Renders observed across all operations.
    #[must_use]
    pub fn total_renders(&self) -> u64 {
        self.hooks.values().map(|h| h.total_renders).sum()
    }

    /// The most recent `limit` violations, oldest first.
    #[must_use]
    pub fn recent_violations(&self, limit: usize) -> Vec<BudgetViolation> {
        let skip = self.violations.len().saturating_sub(limit);
        self.violations.iter().skip(skip).cloned().collect()
    }

    /// Number of retained violations.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Reset every counter and empty the violation list.
    pub fn clear(&mut self) {
        self.hooks.clear();
        self.violations.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    const BUDGET: f64 = 16.0;

    #[test]
    fn test_running_mean() {
        let mut profiler = HookProfileAggregator::new(10);
        let now = Utc::now();
        for duration in [10.0, 20.0, 30.0] {
            profiler.record("List", duration, 100.0, now);
        }

        let hook = profiler.get("List").unwrap();
        assert!((hook.avg_render_time - 20.0).abs() < 1e-9);
        assert_eq!(hook.total_renders, 3);
        assert_eq!(hook.max_render_time, 30.0);
        assert_eq!(hook.last_render_time, 30.0);
    }

    #[test]
    fn test_budget_violation_recorded() {
        let mut profiler = HookProfileAggregator::new(10);
        let violation = profiler.record("Chart", 15.0, 10.0, Utc::now()).unwrap();

        assert!((violation.exceeded - 5.0).abs() < 1e-9);
        assert_eq!(violation.budget, 10.0);
        assert_eq!(violation.metric.violations, 1);
        assert_eq!(profiler.violation_count(), 1);
    }

    #[test]
    fn test_render_at_budget_is_not_a_violation() {
        let mut profiler = HookProfileAggregator::new(10);
        assert!(profiler.record("Chart", BUDGET, BUDGET, Utc::now()).is_none());
        assert_eq!(profiler.get("Chart").unwrap().violations, 0);
    }

    #[test]
    fn test_violation_retention_drops_oldest() {
        let mut profiler = HookProfileAggregator::new(3);
        let now = Utc::now();
        for i in 0..5 {
            profiler.record("Grid", BUDGET + f64::from(i) + 1.0, BUDGET, now);
        }

        let recent = profiler.recent_violations(10);
        assert_eq!(recent.len(), 3);
        assert!((recent[0].exceeded - 3.0).abs() < 1e-9);
        assert!((recent[2].exceeded - 5.0).abs() < 1e-9);
        // Counter is not capped, only the list is
        assert_eq!(profiler.get("Grid").unwrap().violations, 5);
    }

    #[test]
    fn test_recent_violations_limit() {
        let mut profiler = HookProfileAggregator::new(10);
        let now = Utc::now();
        for i in 0..4 {
            profiler.record("Grid", 20.0 + f64::from(i), BUDGET, now);
        }
        let recent = profiler.recent_violations(2);
        assert_eq!(recent.len(), 2);
        assert!((recent[1].metric.last_render_time - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_avg_render_time() {
        let mut profiler = HookProfileAggregator::new(10);
        let now = Utc::now();
        assert!(profiler.avg_render_time().is_none());

        profiler.record("A", 10.0, BUDGET, now);
        profiler.record("A", 10.0, BUDGET, now);
        profiler.record("B", 40.0, 100.0, now);

        // (10 * 2 + 40 * 1) / 3 = 20
        assert!((profiler.avg_render_time().unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(profiler.total_renders(), 3);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut profiler = HookProfileAggregator::new(10);
        profiler.record("A", 50.0, BUDGET, Utc::now());
        profiler.clear();

        assert!(profiler.hook_metrics().is_empty());
        assert_eq!(profiler.violation_count(), 0);
        assert_eq!(profiler.total_renders(), 0);
    }

    #[test]
    fn test_hook_metrics_sorted_by_name() {
        let mut profiler = HookProfileAggregator::new(10);
        let now = Utc::now();
        profiler.record("Zeta", 1.0, BUDGET, now);
        profiler.record("Alpha", 1.0, BUDGET, now);
        let names: Vec<String> = profiler.hook_metrics().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }
}
