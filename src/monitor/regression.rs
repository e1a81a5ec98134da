//! Baseline-relative regression detection.
//!
//! Compares a live [`PerformanceSummary`] against the active
//! [`BaselineMetrics`] and classifies how far each tracked metric has
//! degraded. Detection is a pure function; alert bookkeeping lives in
//! [`super::alerts`].

use serde::{Deserialize, Serialize};

use super::baseline::BaselineMetrics;
use super::summary::PerformanceSummary;
use crate::metrics::names;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Degradation at or above the warning threshold.
    Warning,
    /// Degradation at or above the critical threshold.
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Overall health derived from unacknowledged alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// No unacknowledged alerts.
    Healthy,
    /// At least one unacknowledged warning, no criticals.
    Warning,
    /// At least one unacknowledged critical alert.
    Critical,
}

impl From<Severity> for HealthStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Self::Warning,
            Severity::Critical => Self::Critical,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Detector state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "health", rename_all = "snake_case")]
pub enum RegressionState {
    /// No baseline; checks produce nothing.
    NoBaseline,
    /// Baseline active; health reflects the alert ledger.
    Monitoring(HealthStatus),
}

/// Which way is "better" for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    /// Durations and memory: an increase is a regression.
    LowerIsBetter,
    /// Throughput-style metrics: a decrease is a regression.
    HigherIsBetter,
}

/// Scalar metrics compared against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionMetric {
    /// Summary-level weighted mean render time.
    AvgRenderTime,
    /// First contentful paint.
    Fcp,
    /// Time to interactive.
    Tti,
    /// Memory usage.
    Memory,
}

impl RegressionMetric {
    /// Every metric a check evaluates, in evaluation order.
    pub const ALL: [Self; 4] = [Self::AvgRenderTime, Self::Fcp, Self::Tti, Self::Memory];

    /// Name used in alerts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AvgRenderTime => names::AVG_RENDER_TIME,
            Self::Fcp => names::FCP,
            Self::Tti => names::TTI,
            Self::Memory => names::MEMORY,
        }
    }

    /// Sign convention for degradation.
    #[must_use]
    pub const fn direction(self) -> MetricDirection {
        match self {
            Self::AvgRenderTime | Self::Fcp | Self::Tti | Self::Memory => {
                MetricDirection::LowerIsBetter
            }
        }
    }

    fn baseline_value(self, baseline: &BaselineMetrics) -> Option<f64> {
        match self {
            Self::AvgRenderTime => baseline.avg_render_time,
            Self::Fcp => baseline.fcp,
            Self::Tti => baseline.tti,
            Self::Memory => baseline.memory_usage,
        }
    }

    fn current_value(self, summary: &PerformanceSummary) -> Option<f64> {
        match self {
            Self::AvgRenderTime => summary.avg_render_time,
            Self::Fcp => summary.web_vitals.fcp,
            Self::Tti => summary.web_vitals.tti,
            Self::Memory => summary.memory_usage,
        }
    }
}

/// One metric that crossed a threshold during a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionFinding {
    /// Metric name.
    pub metric: String,
    /// Baseline value.
    pub baseline: f64,
    /// Live value.
    pub current: f64,
    /// Percentage worsening relative to baseline.
    pub degradation: f64,
    /// Classified severity.
    pub severity: Severity,
}

/// Percentage degradation of `current` relative to `baseline`.
///
/// Positive means worse. Returns `None` when the ratio is undefined (a
/// non-positive or non-finite baseline, or a non-finite current value).
#[must_use]
pub fn degradation(baseline: f64, current: f64, direction: MetricDirection) -> Option<f64> {
    if !baseline.is_finite() || !current.is_finite() || baseline <= 0.0 {
        return None;
    }
    let delta = match direction {
        MetricDirection::LowerIsBetter => current - baseline,
        MetricDirection::HigherIsBetter => baseline - current,
    };
    Some(delta / baseline * 100.0)
}

/// Threshold classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionDetector {
    warning_threshold: f64,
    critical_threshold: f64,
}

impl RegressionDetector {
    /// Create a detector with percentage thresholds.
    #[must_use]
    pub const fn new(warning_threshold: f64, critical_threshold: f64) -> Self {
        Self {
            warning_threshold,
            critical_threshold,
        }
    }

    /// Classify a degradation percentage.
    #[must_use]
    pub fn classify(&self, degradation: f64) -> Option<Severity> {
        if degradation >= self.critical_threshold {
            Some(Severity::Critical)
        } else if degradation >= self.warning_threshold {
            Some(Severity::Warning)
        } else {
            None
        }
    }

    /// Compare a summary against a baseline.
    ///
    /// Metrics missing on either side are skipped; the check itself never
    /// fails.
    #[must_use]
    pub fn check(
        &self,
        baseline: &BaselineMetrics,
        summary: &PerformanceSummary,
    ) -> Vec<RegressionFinding> {
        RegressionMetric::ALL
            .iter()
            .filter_map(|metric| {
                let base = metric.baseline_value(baseline)?;
                let current = metric.current_value(summary)?;
                let degradation = degradation(base, current, metric.direction())?;
                let severity = self.classify(degradation)?;
                Some(RegressionFinding {
                    metric: metric.name().to_string(),
                    baseline: base,
                    current,
                    degradation,
                    severity,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::Utc;
    use test_case::test_case;

    fn baseline(avg_render: Option<f64>, memory: Option<f64>) -> BaselineMetrics {
        BaselineMetrics {
            timestamp: Utc::now(),
            sample_count: 10,
            avg_render_time: avg_render,
            fcp: None,
            tti: None,
            memory_usage: memory,
        }
    }

    fn summary(avg_render: Option<f64>, memory: Option<f64>) -> PerformanceSummary {
        let mut summary = PerformanceSummary::empty(Utc::now());
        summary.avg_render_time = avg_render;
        summary.memory_usage = memory;
        summary
    }

    #[test]
    fn test_degradation_formula() {
        assert_eq!(
            degradation(10.0, 15.0, MetricDirection::LowerIsBetter),
            Some(50.0)
        );
        assert_eq!(
            degradation(10.0, 10.0, MetricDirection::LowerIsBetter),
            Some(0.0)
        );
        assert_eq!(
            degradation(10.0, 5.0, MetricDirection::LowerIsBetter),
            Some(-50.0)
        );
    }

    #[test]
    fn test_degradation_inverted_for_higher_is_better() {
        assert_eq!(
            degradation(200.0, 100.0, MetricDirection::HigherIsBetter),
            Some(50.0)
        );
        assert_eq!(
            degradation(200.0, 300.0, MetricDirection::HigherIsBetter),
            Some(-50.0)
        );
    }

    #[test_case(0.0 ; "zero baseline")]
    #[test_case(-1.0 ; "negative baseline")]
    #[test_case(f64::NAN ; "nan baseline")]
    fn test_degradation_undefined(base: f64) {
        assert!(degradation(base, 5.0, MetricDirection::LowerIsBetter).is_none());
    }

    #[test_case(19.9, None ; "just below warning")]
    #[test_case(20.0, Some(Severity::Warning) ; "exactly warning")]
    #[test_case(49.99, Some(Severity::Warning) ; "just below critical")]
    #[test_case(50.0, Some(Severity::Critical) ; "exactly critical")]
    #[test_case(250.0, Some(Severity::Critical) ; "far above critical")]
    #[test_case(-30.0, None ; "improvement")]
    fn test_severity_boundaries(degradation: f64, expected: Option<Severity>) {
        let detector = RegressionDetector::new(20.0, 50.0);
        assert_eq!(detector.classify(degradation), expected);
    }

    #[test]
    fn test_check_reports_degraded_metric() {
        let detector = RegressionDetector::new(20.0, 50.0);
        let findings = detector.check(&baseline(Some(10.0), None), &summary(Some(15.0), None));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].metric, names::AVG_RENDER_TIME);
        assert_eq!(findings[0].degradation, 50.0);
        assert_eq!(findings[0].severity, Severity::Critical);
    }

    #[test]
    fn test_check_no_change_no_finding() {
        let detector = RegressionDetector::new(20.0, 50.0);
        let findings = detector.check(&baseline(Some(10.0), None), &summary(Some(10.0), None));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_check_skips_missing_memory() {
        let detector = RegressionDetector::new(20.0, 50.0);
        // Memory in baseline but unsupported now, and vice versa
        let findings = detector.check(
            &baseline(Some(10.0), Some(100.0)),
            &summary(Some(10.0), None),
        );
        assert!(findings.is_empty());

        let findings = detector.check(&baseline(None, None), &summary(Some(90.0), Some(500.0)));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_all_tracked_metrics_lower_is_better() {
        for metric in RegressionMetric::ALL {
            assert_eq!(metric.direction(), MetricDirection::LowerIsBetter);
        }
    }

    #[test]
    fn test_status_from_severity() {
        assert_eq!(HealthStatus::from(Severity::Warning), HealthStatus::Warning);
        assert_eq!(HealthStatus::from(Severity::Critical), HealthStatus::Critical);
        assert!(HealthStatus::Critical > HealthStatus::Warning);
        assert!(HealthStatus::Warning > HealthStatus::Healthy);
    }
}
