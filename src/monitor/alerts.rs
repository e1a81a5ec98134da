//! Regression alert lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::regression::{HealthStatus, RegressionFinding, Severity};

/// A classified regression, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionAlert {
    /// Unique id (UUID v4).
    pub id: String,
    /// Metric name.
    pub metric: String,
    /// Baseline value the degradation was measured against.
    pub baseline: f64,
    /// Live value when last raised.
    pub current: f64,
    /// Percentage worsening when last raised.
    pub degradation: f64,
    /// Severity when last raised.
    pub severity: Severity,
    /// When the alert was created or last refreshed.
    pub timestamp: DateTime<Utc>,
    /// Whether the operator has acknowledged it.
    pub acknowledged: bool,
}

/// What [`AlertLedger::raise`] did with a finding.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    /// A new alert was appended.
    Created(RegressionAlert),
    /// The metric's open alert was updated in place.
    Refreshed(RegressionAlert),
    /// The metric's latest alert is acknowledged and the finding does not
    /// escalate it.
    Suppressed,
}

/// Ordered list of alerts with acknowledgment bookkeeping.
///
/// At most one unacknowledged alert exists per metric.
#[derive(Debug, Clone, Default)]
pub struct AlertLedger {
    alerts: Vec<RegressionAlert>,
}

impl AlertLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding.
    pub fn raise(&mut self, finding: RegressionFinding, now: DateTime<Utc>) -> AlertOutcome {
        let latest = self
            .alerts
            .iter_mut()
            .rev()
            .find(|alert| alert.metric == finding.metric);

        match latest {
            Some(alert) if !alert.acknowledged => {
                alert.baseline = finding.baseline;
                alert.current = finding.current;
                alert.degradation = finding.degradation;
                alert.severity = finding.severity;
                alert.timestamp = now;
                return AlertOutcome::Refreshed(alert.clone());
            }
            Some(alert) if finding.severity <= alert.severity => {
                return AlertOutcome::Suppressed;
            }
            _ => {}
        }

        let alert = RegressionAlert {
            id: uuid::Uuid::new_v4().to_string(),
            metric: finding.metric,
            baseline: finding.baseline,
            current: finding.current,
            degradation: finding.degradation,
            severity: finding.severity,
            timestamp: now,
            acknowledged: false,
        };
        self.alerts.push(alert.clone());
        AlertOutcome::Created(alert)
    }

    /// Acknowledge one alert. Returns `true` only if its flag changed.
    pub fn acknowledge(&mut self, id: &str) -> bool {
        match self.alerts.iter_mut().find(|alert| alert.id == id) {
            Some(alert) if !alert.acknowledged => {
                alert.acknowledged = true;
                true
            }
            _ => false,
        }
    }

    /// Acknowledge every open alert; returns how many changed.
    pub fn acknowledge_all(&mut self) -> usize {
        let mut changed = 0;
        for alert in self.alerts.iter_mut().filter(|alert| !alert.acknowledged) {
            alert.acknowledged = true;
            changed += 1;
        }
        changed
    }

    /// Remove acknowledged alerts; returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let before = self.alerts.len();
        self.alerts.retain(|alert| !alert.acknowledged);
        before - self.alerts.len()
    }

    /// Health derived from unacknowledged alerts.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        self.unacknowledged()
            .map(|alert| HealthStatus::from(alert.severity))
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }

    /// All alerts in creation order.
    #[must_use]
    pub fn alerts(&self) -> &[RegressionAlert] {
        &self.alerts
    }

    /// Open alerts in creation order.
    pub fn unacknowledged(&self) -> impl Iterator<Item = &RegressionAlert> {
        self.alerts.iter().filter(|alert| !alert.acknowledged)
    }

    /// Number of alerts held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Whether the ledger holds no alerts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
