//! Keyboard shortcut tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use perf_sentinel::config::MonitorConfig;
use perf_sentinel::service::{Shortcut, ShortcutOutcome};

use super::spawn;

#[tokio::test(start_paused = true)]
async fn test_every_key_maps_to_an_operation() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;
    handle.record_render("Grid", 9.0).await.unwrap();

    let mut outcomes = Vec::new();
    for key in ['b', 'd', 'm', 'm', 'a', 'c'] {
        let shortcut = Shortcut::from_key(key).unwrap();
        outcomes.push(shortcut.apply(handle).await.unwrap());
    }

    assert!(matches!(outcomes[0], ShortcutOutcome::BaselineCaptured(_)));
    assert_eq!(outcomes[1], ShortcutOutcome::DashboardVisible(true));
    assert_eq!(outcomes[2], ShortcutOutcome::Monitoring(false));
    assert_eq!(outcomes[3], ShortcutOutcome::Monitoring(true));
    assert_eq!(outcomes[4], ShortcutOutcome::Acknowledged(0));
    assert_eq!(outcomes[5], ShortcutOutcome::MetricsCleared);

    let status = handle.status();
    assert!(status.dashboard_visible);
    assert!(status.monitoring);
    assert!(status.has_baseline);
    assert_eq!(status.total_metrics, 0);
}

#[tokio::test(start_paused = true)]
async fn test_export_shortcut_returns_report() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;
    handle.record_render("Grid", 9.0).await.unwrap();

    let outcome = Shortcut::ExportReport.apply(handle).await.unwrap();
    let ShortcutOutcome::ReportReady(report) = outcome else {
        unreachable!("export yields a report");
    };
    assert_eq!(report.summary.total_metrics, 0);
    assert!(report.alerts.is_empty());
}
