//! Keyboard shortcuts.
//!
//! Each key maps to exactly one [`MonitorHandle`] operation.

use crate::error::AppError;
use crate::monitor::BaselineMetrics;
use crate::report::PerformanceReport;

use super::MonitorHandle;

/// A recognized shortcut key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shortcut {
    /// `d`: show or hide the dashboard.
    ToggleDashboard,
    /// `b`: capture a baseline.
    CaptureBaseline,
    /// `c`: clear history and render profiles.
    ClearMetrics,
    /// `e`: export a report.
    ExportReport,
    /// `m`: start or stop monitoring.
    ToggleMonitoring,
    /// `a`: acknowledge every open alert.
    AcknowledgeAll,
}

impl Shortcut {
    /// Every shortcut, in help-text order.
    pub const ALL: [Self; 6] = [
        Self::ToggleDashboard,
        Self::CaptureBaseline,
        Self::ClearMetrics,
        Self::ExportReport,
        Self::ToggleMonitoring,
        Self::AcknowledgeAll,
    ];

    /// Look up a key, ignoring case.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'd' => Some(Self::ToggleDashboard),
            'b' => Some(Self::CaptureBaseline),
            'c' => Some(Self::ClearMetrics),
            'e' => Some(Self::ExportReport),
            'm' => Some(Self::ToggleMonitoring),
            'a' => Some(Self::AcknowledgeAll),
            _ => None,
        }
    }

    /// The key bound to this shortcut.
    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Self::ToggleDashboard => 'd',
            Self::CaptureBaseline => 'b',
            Self::ClearMetrics => 'c',
            Self::ExportReport => 'e',
            Self::ToggleMonitoring => 'm',
            Self::AcknowledgeAll => 'a',
        }
    }

    /// One-line help text.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ToggleDashboard => "toggle dashboard",
            Self::CaptureBaseline => "capture baseline",
            Self::ClearMetrics => "clear metrics",
            Self::ExportReport => "export report",
            Self::ToggleMonitoring => "toggle monitoring",
            Self::AcknowledgeAll => "acknowledge all alerts",
        }
    }

    /// Run the bound operation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Baseline`] when a baseline capture is rejected and
    /// [`AppError::Service`] when the service is unreachable.
    pub async fn apply(self, handle: &MonitorHandle) -> Result<ShortcutOutcome, AppError> {
        let outcome = match self {
            Self::ToggleDashboard => {
                ShortcutOutcome::DashboardVisible(handle.toggle_dashboard().await?)
            }
            Self::CaptureBaseline => {
                ShortcutOutcome::BaselineCaptured(handle.capture_baseline().await?)
            }
            Self::ClearMetrics => {
                handle.clear_metrics().await?;
                ShortcutOutcome::MetricsCleared
            }
            Self::ExportReport => {
                ShortcutOutcome::ReportReady(Box::new(handle.export_report().await?))
            }
            Self::ToggleMonitoring => {
                ShortcutOutcome::Monitoring(handle.toggle_monitoring().await?)
            }
            Self::AcknowledgeAll => {
                ShortcutOutcome::Acknowledged(handle.acknowledge_all_alerts().await?)
            }
        };
        Ok(outcome)
    }
}

impl std::fmt::Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key(), self.description())
    }
}

/// Result of applying a [`Shortcut`].
#[derive(Debug, Clone, PartialEq)]
pub enum ShortcutOutcome {
    /// New dashboard visibility.
    DashboardVisible(bool),
    /// The baseline now active.
    BaselineCaptured(BaselineMetrics),
    /// History and render profiles were reset.
    MetricsCleared,
    /// A report ready to be written.
    ReportReady(Box<PerformanceReport>),
    /// New monitoring state.
    Monitoring(bool),
    /// Number of alerts acknowledged.
    Acknowledged(usize),
}
