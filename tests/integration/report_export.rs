//! Report export tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use perf_sentinel::config::MonitorConfig;
use perf_sentinel::input::{InputLine, LineOutcome};
use perf_sentinel::metrics::names;
use perf_sentinel::report::{PerformanceReport, ReportExporter};
use tempfile::TempDir;

use super::spawn;

#[tokio::test(start_paused = true)]
async fn test_exported_report_contents() {
    let harness = spawn(MonitorConfig::default());
    let handle = &harness.handle;
    let dir = TempDir::new().expect("Failed to create temp dir");

    handle.record_sample(names::FCP, 1000.0).await.unwrap();
    handle.record_render("Table", 8.0).await.unwrap();
    handle.capture_baseline().await.unwrap();
    handle.record_sample(names::FCP, 1700.0).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5_050)).await;

    let report = handle.export_report().await.unwrap();
    let path = ReportExporter::write_to_dir(&report, dir.path()).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["status"], "critical");
    assert_eq!(json["baseline"]["fcp"], 1000.0);
    assert_eq!(json["summary"]["webVitals"]["fcp"], 1700.0);
    assert_eq!(json["history"]["fcp"].as_array().unwrap().len(), 2);
    assert_eq!(json["alerts"][0]["metric"], "fcp");
    assert_eq!(json["alerts"][0]["severity"], "critical");
    assert_eq!(json["alerts"][0]["acknowledged"], false);

    let parsed: PerformanceReport = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.alerts.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_export_key_line_writes_file() {
    let harness = spawn(MonitorConfig::default());
    let dir = TempDir::new().expect("Failed to create temp dir");
    let report_dir = dir.path().join("nested").join("reports");

    for line in [
        r#"{"type":"render","name":"Grid","durationMs":30}"#,
        r#"{"type":"key","key":"e"}"#,
    ] {
        let outcome = InputLine::parse(line)
            .unwrap()
            .dispatch(&harness.handle, &report_dir)
            .await
            .unwrap();
        if let LineOutcome::Exported(path) = outcome {
            assert!(path.starts_with(&report_dir));
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("performance-report-"));
            assert!(name.ends_with(".json"));
        }
    }

    assert_eq!(std::fs::read_dir(&report_dir).unwrap().count(), 1);
}
