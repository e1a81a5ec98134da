//! Operator-captured reference baselines.
//!
//! A baseline is an explicit checkpoint ("performance was acceptable at this
//! moment"). It is never inferred automatically; exactly one is active at a
//! time and capturing again replaces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::summary::PerformanceSummary;
use crate::error::BaselineError;

/// The reference values regression checks compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineMetrics {
    /// When the baseline was captured.
    pub timestamp: DateTime<Utc>,
    /// `total_metrics` of the summary at capture time.
    pub sample_count: u64,
    /// Weighted mean render time (ms).
    pub avg_render_time: Option<f64>,
    /// First contentful paint (ms).
    pub fcp: Option<f64>,
    /// Time to interactive (ms).
    pub tti: Option<f64>,
    /// Memory usage (MB).
    pub memory_usage: Option<f64>,
}

impl BaselineMetrics {
    /// Record a summary verbatim.
    #[must_use]
    pub fn from_summary(summary: &PerformanceSummary, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            sample_count: summary.total_metrics,
            avg_render_time: summary.avg_render_time,
            fcp: summary.web_vitals.fcp,
            tti: summary.web_vitals.tti,
            memory_usage: summary.memory_usage,
        }
    }
}

/// Holds the single active baseline.
#[derive(Debug, Clone)]
pub struct BaselineManager {
    current: Option<BaselineMetrics>,
    min_samples: u64,
}

impl BaselineManager {
    /// Create a manager requiring `min_samples` (at least one) per capture.
    #[must_use]
    pub fn new(min_samples: u64) -> Self {
        Self {
            current: None,
            min_samples: min_samples.max(1),
        }
    }

    /// Capture `summary` as the new baseline.
    ///
    /// # Errors
    ///
    /// Returns [`BaselineError::InsufficientSamples`] when the summary has
    /// seen fewer samples than required. The previous baseline, if any, is
    /// kept.
    pub fn capture(
        &mut self,
        summary: &PerformanceSummary,
        now: DateTime<Utc>,
    ) -> Result<&BaselineMetrics, BaselineError> {
        if summary.total_metrics < self.min_samples {
            return Err(BaselineError::InsufficientSamples {
                required: self.min_samples,
                actual: summary.total_metrics,
            });
        }
        let baseline = self
            .current
            .insert(BaselineMetrics::from_summary(summary, now));
        Ok(&*baseline)
    }

    /// Drop the active baseline; returns whether one existed.
    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// The active baseline.
    #[must_use]
    pub const fn current(&self) -> Option<&BaselineMetrics> {
        self.current.as_ref()
    }

    /// Whether a baseline is active.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.current.is_some()
    }
}
