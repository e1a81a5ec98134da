//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading
//! - Configuration validation
//! - Default value handling
//! - Per-operation render budgets
//!
//! # Example
//!
//! ```
//! use perf_sentinel::config::MonitorConfig;
//!
//! let config = MonitorConfig {
//!     warning_threshold: 10.0,
//!     critical_threshold: 25.0,
//!     ..MonitorConfig::default()
//! }
//! .with_budget("SearchPanel", 8.0);
//!
//! assert!((config.budget_for("SearchPanel") - 8.0).abs() < f64::EPSILON);
//! assert!((config.budget_for("Unlisted") - 16.0).abs() < f64::EPSILON);
//! ```

mod validation;

pub use validation::{
    validate_config, MAX_INTERVAL_MS, MAX_THRESHOLD_PERCENT, MIN_DATA_POINTS, MIN_INTERVAL_MS,
};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default sampling/summary refresh interval in milliseconds.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Default regression check interval in milliseconds.
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 5_000;

/// Default per-metric history capacity.
pub const DEFAULT_MAX_DATA_POINTS: usize = 30;

/// Default render budget in milliseconds (one 60fps frame).
pub const DEFAULT_BUDGET_MS: f64 = 16.0;

/// Default warning threshold (percent degradation).
pub const DEFAULT_WARNING_THRESHOLD: f64 = 20.0;

/// Default critical threshold (percent degradation).
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 50.0;

/// Default number of retained budget violations.
pub const DEFAULT_MAX_VIOLATIONS: usize = 50;

/// Default number of violations shown in a summary.
pub const DEFAULT_SUMMARY_VIOLATION_LIMIT: usize = 10;

/// Default minimum sample count for a baseline capture.
pub const DEFAULT_MIN_BASELINE_SAMPLES: u64 = 1;

/// Default directory for exported reports.
pub const DEFAULT_REPORT_DIR: &str = ".";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Whether monitoring starts immediately by default.
pub const DEFAULT_AUTO_START: bool = true;

/// Default number of undrained events a session holds.
pub const DEFAULT_MAX_PENDING_EVENTS: usize = 256;

/// Monitoring engine configuration.
///
/// All budgets and thresholds are injected here rather than hard-coded in
/// the components. Use [`MonitorConfig::from_env`] to load from environment
/// variables, or build one directly and call [`validate_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Sampling/summary cadence in milliseconds.
    pub refresh_interval_ms: u64,
    /// Regression check cadence in milliseconds.
    pub check_interval_ms: u64,
    /// Capacity of each metric's rolling history.
    pub max_data_points: usize,
    /// Render budget applied to operations without an override.
    pub default_budget_ms: f64,
    /// Per-operation render budget overrides.
    pub budgets: BTreeMap<String, f64>,
    /// Degradation percentage at which a warning is raised.
    pub warning_threshold: f64,
    /// Degradation percentage at which a critical alert is raised.
    pub critical_threshold: f64,
    /// Retention of the budget violation list.
    pub max_violations: usize,
    /// How many recent violations a summary carries.
    pub summary_violation_limit: usize,
    /// Minimum `total_metrics` required to capture a baseline.
    pub min_baseline_samples: u64,
    /// Directory exported reports are written to.
    pub report_dir: PathBuf,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Start sampling and regression checks as soon as the service runs.
    pub auto_start: bool,
    /// Undrained events retained by a session; the oldest are dropped.
    pub max_pending_events: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            max_data_points: DEFAULT_MAX_DATA_POINTS,
            default_budget_ms: DEFAULT_BUDGET_MS,
            budgets: BTreeMap::new(),
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            max_violations: DEFAULT_MAX_VIOLATIONS,
            summary_violation_limit: DEFAULT_SUMMARY_VIOLATION_LIMIT,
            min_baseline_samples: DEFAULT_MIN_BASELINE_SAMPLES,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            auto_start: DEFAULT_AUTO_START,
            max_pending_events: DEFAULT_MAX_PENDING_EVENTS,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `PERF_REFRESH_INTERVAL_MS`: sampling cadence (default: `1000`)
    /// - `PERF_CHECK_INTERVAL_MS`: regression cadence (default: `5000`)
    /// - `PERF_MAX_DATA_POINTS`: history capacity (default: `30`)
    /// - `PERF_DEFAULT_BUDGET_MS`: render budget (default: `16`)
    /// - `PERF_BUDGETS`: overrides as `name=ms,name=ms`
    /// - `PERF_WARNING_THRESHOLD`: percent (default: `20`)
    /// - `PERF_CRITICAL_THRESHOLD`: percent (default: `50`)
    /// - `PERF_MAX_VIOLATIONS`: violation retention (default: `50`)
    /// - `PERF_SUMMARY_VIOLATION_LIMIT`: violations per summary (default: `10`)
    /// - `PERF_MIN_BASELINE_SAMPLES`: baseline guard (default: `1`)
    /// - `PERF_REPORT_DIR`: export directory (default: `.`)
    /// - `PERF_AUTO_START`: begin monitoring at startup (default: `true`)
    /// - `PERF_MAX_PENDING_EVENTS`: undrained event retention (default: `256`)
    /// - `LOG_LEVEL`: logging level (default: `info`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable cannot be parsed or any value
    /// fails validation (see [`validate_config`]).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let budgets = match std::env::var("PERF_BUDGETS") {
            Ok(raw) => parse_budgets(&raw)?,
            Err(_) => BTreeMap::new(),
        };

        let config = Self {
            refresh_interval_ms: parse_env("PERF_REFRESH_INTERVAL_MS", DEFAULT_REFRESH_INTERVAL_MS)?,
            check_interval_ms: parse_env("PERF_CHECK_INTERVAL_MS", DEFAULT_CHECK_INTERVAL_MS)?,
            max_data_points: parse_env("PERF_MAX_DATA_POINTS", DEFAULT_MAX_DATA_POINTS)?,
            default_budget_ms: parse_env("PERF_DEFAULT_BUDGET_MS", DEFAULT_BUDGET_MS)?,
            budgets,
            warning_threshold: parse_env("PERF_WARNING_THRESHOLD", DEFAULT_WARNING_THRESHOLD)?,
            critical_threshold: parse_env("PERF_CRITICAL_THRESHOLD", DEFAULT_CRITICAL_THRESHOLD)?,
            max_violations: parse_env("PERF_MAX_VIOLATIONS", DEFAULT_MAX_VIOLATIONS)?,
            summary_violation_limit: parse_env(
                "PERF_SUMMARY_VIOLATION_LIMIT",
                DEFAULT_SUMMARY_VIOLATION_LIMIT,
            )?,
            min_baseline_samples: parse_env(
                "PERF_MIN_BASELINE_SAMPLES",
                DEFAULT_MIN_BASELINE_SAMPLES,
            )?,
            report_dir: std::env::var("PERF_REPORT_DIR")
                .map_or_else(|_| PathBuf::from(DEFAULT_REPORT_DIR), PathBuf::from),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into()),
            auto_start: parse_env("PERF_AUTO_START", DEFAULT_AUTO_START)?,
            max_pending_events: parse_env(
                "PERF_MAX_PENDING_EVENTS",
                DEFAULT_MAX_PENDING_EVENTS,
            )?,
        };

        validate_config(&config)?;
        Ok(config)
    }

    /// Add a budget override for a named operation.
    #[must_use]
    pub fn with_budget(mut self, name: impl Into<String>, budget_ms: f64) -> Self {
        self.budgets.insert(name.into(), budget_ms);
        self
    }

    /// Render budget for an operation, falling back to the default.
    #[must_use]
    pub fn budget_for(&self, name: &str) -> f64 {
        self.budgets
            .get(name)
            .copied()
            .unwrap_or(self.default_budget_ms)
    }

    /// Sampling cadence as a [`Duration`].
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    /// Regression check cadence as a [`Duration`].
    #[must_use]
    pub const fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

/// Parse an environment variable, using a default if not set.
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: format!("cannot parse '{val}'"),
        })
    })
}

/// Parse `name=ms` pairs separated by commas.
fn parse_budgets(raw: &str) -> Result<BTreeMap<String, f64>, ConfigError> {
    let mut budgets = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let invalid = || ConfigError::InvalidValue {
            var: "PERF_BUDGETS".into(),
            reason: format!("expected name=ms, got '{entry}'"),
        };
        let (name, value) = entry.split_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        let budget: f64 = value.trim().parse().map_err(|_| invalid())?;
        budgets.insert(name.to_string(), budget);
    }
    Ok(budgets)
}
