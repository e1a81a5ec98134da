//! JSON-lines input for the `perf-sentinel` binary.
//!
//! Each line on stdin is one observation or one shortcut key:
//!
//! ```text
//! {"type":"sample","name":"fcp","value":1180.5}
//! {"type":"render","name":"SearchPanel","durationMs":12.4}
//! {"type":"key","key":"b"}
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::AppError;
use crate::report::ReportExporter;
use crate::service::{MonitorHandle, Shortcut, ShortcutOutcome};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputLine {
    /// A data point for a named metric.
    Sample {
        /// Metric name.
        name: String,
        /// Value.
        value: f64,
    },
    /// A render of a named operation.
    Render {
        /// Operation name.
        name: String,
        /// Render duration (ms).
        #[serde(rename = "durationMs")]
        duration_ms: f64,
    },
    /// A shortcut key press.
    Key {
        /// The key.
        key: char,
    },
}

/// What handling a line did, for the caller to report.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// The line was an observation and has been queued.
    Recorded,
    /// A shortcut ran.
    Shortcut(ShortcutOutcome),
    /// The export shortcut wrote a report.
    Exported(PathBuf),
    /// The key is not bound to anything.
    UnknownKey(char),
}

/// Why [`process_lines`] stopped reading.
#[derive(Debug)]
pub enum InputEnd {
    /// The reader reached end of input.
    Closed,
    /// Reading failed; lines before the failure were applied.
    Failed(std::io::Error),
}

impl InputLine {
    /// Parse one line.
    ///
    /// # Errors
    ///
    /// Returns the JSON error for malformed or unrecognized lines.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim())
    }

    /// Forward the line to the service.
    ///
    /// The export shortcut additionally writes the report into `report_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] if the service is unreachable, a baseline capture
    /// is rejected, or the report cannot be written.
    pub async fn dispatch(
        self,
        handle: &MonitorHandle,
        report_dir: &Path,
    ) -> Result<LineOutcome, AppError> {
        match self {
            Self::Sample { name, value } => {
                handle.record_sample(name, value).await?;
                Ok(LineOutcome::Recorded)
            }
            Self::Render { name, duration_ms } => {
                handle.record_render(name, duration_ms).await?;
                Ok(LineOutcome::Recorded)
            }
            Self::Key { key } => {
                let Some(shortcut) = Shortcut::from_key(key) else {
                    return Ok(LineOutcome::UnknownKey(key));
                };
                match shortcut.apply(handle).await? {
                    ShortcutOutcome::ReportReady(report) => {
                        let path = ReportExporter::write_to_dir(&report, report_dir)?;
                        Ok(LineOutcome::Exported(path))
                    }
                    outcome => Ok(LineOutcome::Shortcut(outcome)),
                }
            }
        }
    }
}

/// Apply every line from `reader` until it closes or fails.
///
/// Malformed lines and rejected operations are logged and skipped; only a
/// read failure ends processing early.
pub async fn process_lines<R>(reader: R, handle: &MonitorHandle, report_dir: &Path) -> InputEnd
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => apply_line(handle, &line, report_dir).await,
            Ok(None) => return InputEnd::Closed,
            Err(e) => return InputEnd::Failed(e),
        }
    }
}

async fn apply_line(handle: &MonitorHandle, line: &str, report_dir: &Path) {
    let input = match InputLine::parse(line) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed input line");
            return;
        }
    };

    match input.dispatch(handle, report_dir).await {
        Ok(LineOutcome::Recorded) => {}
        Ok(LineOutcome::Exported(path)) => {
            tracing::info!(path = %path.display(), "Report exported");
        }
        Ok(LineOutcome::UnknownKey(key)) => {
            tracing::warn!(%key, "Unbound shortcut key");
        }
        Ok(LineOutcome::Shortcut(outcome)) => {
            tracing::debug!(?outcome, "Shortcut applied");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Input not applied");
        }
    }
}
