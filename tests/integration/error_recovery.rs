//! Error recovery and edge case tests.
//!
//! Tests how the service handles rejected operations and shutdown.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use perf_sentinel::config::MonitorConfig;
use perf_sentinel::error::{AppError, BaselineError, ServiceError};
use perf_sentinel::input::{InputLine, LineOutcome};

use super::spawn;

#[tokio::test(start_paused = true)]
async fn test_baseline_rejected_without_samples() {
    let harness = spawn(MonitorConfig::default());

    let err = harness.handle.capture_baseline().await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Baseline(BaselineError::InsufficientSamples {
            required: 1,
            actual: 0
        })
    ));
    assert!(!harness.handle.status().has_baseline);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_alert_id_is_noop() {
    let harness = spawn(MonitorConfig::default());
    assert!(!harness.handle.acknowledge_alert("missing").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_non_finite_samples_ignored() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;

    handle.record_sample("fcp", f64::NAN).await.unwrap();
    handle.record_render("Grid", f64::INFINITY).await.unwrap();
    handle.clear_metrics().await.unwrap();

    assert_eq!(handle.summary().await.unwrap().total_metrics, 0);
}

#[tokio::test(start_paused = true)]
async fn test_unbound_key_reported() {
    let harness = spawn(MonitorConfig::default());
    let outcome = InputLine::Key { key: 'q' }
        .dispatch(&harness.handle, std::path::Path::new("."))
        .await
        .unwrap();
    assert_eq!(outcome, LineOutcome::UnknownKey('q'));
}

#[tokio::test(start_paused = true)]
async fn test_handle_fails_after_shutdown() {
    let harness = spawn(MonitorConfig::default());
    let handle = harness.handle.clone();

    harness.shutdown_tx.send(true).unwrap();
    harness.task.await.unwrap();

    assert!(!handle.status().running);
    assert_eq!(
        handle.record_render("Grid", 1.0).await.unwrap_err(),
        ServiceError::NotRunning
    );
    assert!(matches!(
        handle.summary().await.unwrap_err(),
        ServiceError::NotRunning
    ));
}
