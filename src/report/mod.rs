//! Report export.
//!
//! A [`PerformanceReport`] is a read-only projection of a monitoring session:
//! the current summary, the raw history with per-metric trends, every alert,
//! and the active baseline. Exporting to disk is the only persistence the
//! engine performs.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use perf_sentinel::report::ReportExporter;
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
//! assert_eq!(
//!     ReportExporter::filename(now),
//!     "performance-report-20240309T140500.000Z.json"
//! );
//! ```

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::metrics::Trend;
use crate::monitor::{BaselineMetrics, HealthStatus, PerformanceSummary, RegressionAlert};

/// Prefix of exported report filenames.
pub const REPORT_FILE_PREFIX: &str = "performance-report";

/// How many suffixed names are tried before a write gives up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Everything an exported report contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    /// When the report was produced.
    pub exported_at: DateTime<Utc>,
    /// Health at export time.
    pub status: HealthStatus,
    /// Last composed summary.
    pub summary: PerformanceSummary,
    /// Raw history, oldest value first.
    pub history: BTreeMap<String, Vec<f64>>,
    /// Trend of each metric in `history`.
    pub trends: BTreeMap<String, Trend>,
    /// All alerts, acknowledged or not.
    pub alerts: Vec<RegressionAlert>,
    /// Active baseline, if any.
    pub baseline: Option<BaselineMetrics>,
}

/// Serializes and writes [`PerformanceReport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportExporter;

impl ReportExporter {
    /// Pretty-printed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Serialization`] if the report cannot be encoded.
    pub fn to_json(report: &PerformanceReport) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Timestamped filename (millisecond precision) for a report exported
    /// at `now`.
    #[must_use]
    pub fn filename(now: DateTime<Utc>) -> String {
        Self::suffixed_filename(now, 0)
    }

    fn suffixed_filename(now: DateTime<Utc>, attempt: u32) -> String {
        let stamp = now.format("%Y%m%dT%H%M%S%.3fZ");
        if attempt == 0 {
            format!("{REPORT_FILE_PREFIX}-{stamp}.json")
        } else {
            format!("{REPORT_FILE_PREFIX}-{stamp}-{attempt}.json")
        }
    }

    /// Write `report` into `dir`, creating the directory if needed.
    ///
    /// Existing files are never overwritten: a name already taken gets a
    /// numeric suffix. Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if the report cannot be serialized or the
    /// file cannot be written.
    pub fn write_to_dir(report: &PerformanceReport, dir: &Path) -> Result<PathBuf, ExportError> {
        let json = Self::to_json(report)?;
        let write_error = |path: &Path, err: &std::io::Error| ExportError::Write {
            path: path.display().to_string(),
            message: err.to_string(),
        };

        std::fs::create_dir_all(dir).map_err(|e| write_error(dir, &e))?;

        let mut attempt = 0;
        let (path, mut file) = loop {
            let path = dir.join(Self::suffixed_filename(report.exported_at, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                    attempt += 1;
                }
                Err(e) => return Err(write_error(&path, &e)),
            }
        };
        file.write_all(json.as_bytes())
            .map_err(|e| write_error(&path, &e))?;

        tracing::info!(
            path = %path.display(),
            alerts = report.alerts.len(),
            status = %report.status,
            "Performance report exported"
        );
        Ok(path)
    }
}
