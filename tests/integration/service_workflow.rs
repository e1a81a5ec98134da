//! Service lifecycle tests.
//!
//! Tests the refresh and check ticks, monitoring start/stop, and the
//! acknowledgment flow through the handle.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::time::Duration;

use perf_sentinel::config::MonitorConfig;
use perf_sentinel::metrics::{names, Trend};
use perf_sentinel::monitor::{HealthStatus, MonitorEvent, Severity};
use perf_sentinel::traits::TimeProvider;

use super::spawn;

#[tokio::test(start_paused = true)]
async fn test_regression_raised_on_check_tick() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;
    let mut events = handle.events();

    handle.record_render("Table", 8.0).await.unwrap();
    handle.capture_baseline().await.unwrap();
    for duration in [16.0, 16.0, 24.0] {
        handle.record_render("Table", duration).await.unwrap();
    }
    harness.clock.advance(chrono::Duration::seconds(5));

    tokio::time::sleep(Duration::from_millis(5_050)).await;

    let alerts = handle.alerts().await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].metric, names::AVG_RENDER_TIME);
    assert_eq!(alerts[0].degradation, 100.0);
    assert_eq!(alerts[0].severity, Severity::Critical);
    assert_eq!(alerts[0].timestamp, harness.clock.now());
    assert!(!alerts[0].acknowledged);

    let status = handle.status();
    assert_eq!(status.health, Some(HealthStatus::Critical));
    assert_eq!(status.unacknowledged_alerts, 1);

    let mut raised = None;
    while let Ok(event) = events.try_recv() {
        if let MonitorEvent::AlertRaised { alert } = event {
            raised = Some(alert);
        }
    }
    assert_eq!(raised.unwrap().id, alerts[0].id);

    assert_eq!(handle.acknowledge_all_alerts().await.unwrap(), 1);
    assert_eq!(handle.status().health, Some(HealthStatus::Healthy));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_ticks_keep_single_alert() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;

    handle.record_render("Table", 10.0).await.unwrap();
    handle.capture_baseline().await.unwrap();
    handle.record_render("Table", 50.0).await.unwrap();

    // Four check ticks
    tokio::time::sleep(Duration::from_millis(20_050)).await;

    assert_eq!(handle.alerts().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_acknowledged_alert_not_reraised_at_same_severity() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;

    handle.record_render("Table", 10.0).await.unwrap();
    handle.capture_baseline().await.unwrap();
    handle.record_render("Table", 50.0).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5_050)).await;

    let alerts = handle.alerts().await.unwrap();
    assert!(handle.acknowledge_alert(alerts[0].id.clone()).await.unwrap());
    assert!(!handle.acknowledge_alert(alerts[0].id.clone()).await.unwrap());

    tokio::time::sleep(Duration::from_secs(10)).await;

    let alerts = handle.alerts().await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].acknowledged);
    assert_eq!(handle.status().health, Some(HealthStatus::Healthy));

    assert_eq!(handle.clear_alerts().await.unwrap(), 1);
    assert!(handle.alerts().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_pauses_checks_and_start_resumes() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;

    handle.record_render("Table", 10.0).await.unwrap();
    handle.capture_baseline().await.unwrap();
    assert!(handle.stop_monitoring().await.unwrap());
    handle.record_render("Table", 50.0).await.unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(handle.alerts().await.unwrap().is_empty());
    assert!(!handle.status().monitoring);

    assert!(handle.start_monitoring().await.unwrap());
    assert!(!handle.start_monitoring().await.unwrap());
    tokio::time::sleep(Duration::from_millis(5_050)).await;
    assert_eq!(handle.alerts().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cleared_baseline_stops_new_alerts() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;

    handle.record_render("Table", 10.0).await.unwrap();
    handle.capture_baseline().await.unwrap();
    assert!(handle.clear_baseline().await.unwrap());
    handle.record_render("Table", 90.0).await.unwrap();

    tokio::time::sleep(Duration::from_millis(10_050)).await;

    assert!(handle.alerts().await.unwrap().is_empty());
    assert!(!handle.status().has_baseline);
}

#[tokio::test(start_paused = true)]
async fn test_trend_visible_through_handle() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;

    for value in [100.0, 110.0, 300.0, 320.0] {
        handle.record_sample(names::INTERACTION, value).await.unwrap();
    }

    assert_eq!(handle.trend(names::INTERACTION).await.unwrap(), Trend::Up);
    assert_eq!(handle.trend("unknown").await.unwrap(), Trend::Collecting);
}

#[tokio::test(start_paused = true)]
async fn test_check_now_bypasses_cadence() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;

    handle.record_sample(names::TTI, 2000.0).await.unwrap();
    handle.capture_baseline().await.unwrap();
    handle.record_sample(names::TTI, 2500.0).await.unwrap();

    // Let one refresh tick compose the new summary, well before the first check
    tokio::time::sleep(Duration::from_millis(1_050)).await;
    let raised = handle.check_now().await.unwrap();

    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].metric, names::TTI);
    assert_eq!(raised[0].severity, Severity::Warning);
}
