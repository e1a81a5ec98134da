//! Configuration validation.
//!
//! This module provides validation logic for configuration values,
//! ensuring they are within acceptable ranges.

use super::MonitorConfig;
use crate::error::ConfigError;

/// Minimum allowed tick interval in milliseconds.
pub const MIN_INTERVAL_MS: u64 = 100;

/// Maximum allowed tick interval in milliseconds (1 hour).
pub const MAX_INTERVAL_MS: u64 = 3_600_000;

/// Minimum history capacity (a trend needs two points).
pub const MIN_DATA_POINTS: usize = 2;

/// Upper bound for degradation thresholds (percent).
pub const MAX_THRESHOLD_PERCENT: f64 = 10_000.0;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - intervals must be between 100ms and 1h
/// - `max_data_points` must be at least 2
/// - budgets must be positive and finite
/// - `0 < warning_threshold < critical_threshold`
/// - `max_violations`, `min_baseline_samples` and `max_pending_events` must
///   be at least 1
pub fn validate_config(config: &MonitorConfig) -> Result<(), ConfigError> {
    check_interval("PERF_REFRESH_INTERVAL_MS", config.refresh_interval_ms)?;
    check_interval("PERF_CHECK_INTERVAL_MS", config.check_interval_ms)?;

    if config.max_data_points < MIN_DATA_POINTS {
        return Err(invalid(
            "PERF_MAX_DATA_POINTS",
            format!("must be at least {MIN_DATA_POINTS}"),
        ));
    }

    if !is_positive(config.default_budget_ms) {
        return Err(invalid("PERF_DEFAULT_BUDGET_MS", "must be a positive number"));
    }

    if let Some((name, _)) = config.budgets.iter().find(|(_, b)| !is_positive(**b)) {
        return Err(invalid(
            "PERF_BUDGETS",
            format!("budget for '{name}' must be a positive number"),
        ));
    }

    if !is_positive(config.warning_threshold) || config.warning_threshold > MAX_THRESHOLD_PERCENT
    {
        return Err(invalid(
            "PERF_WARNING_THRESHOLD",
            format!("must be between 0 and {MAX_THRESHOLD_PERCENT}"),
        ));
    }

    if !config.critical_threshold.is_finite()
        || config.critical_threshold <= config.warning_threshold
        || config.critical_threshold > MAX_THRESHOLD_PERCENT
    {
        return Err(invalid(
            "PERF_CRITICAL_THRESHOLD",
            "must be greater than the warning threshold",
        ));
    }

    if config.max_violations == 0 {
        return Err(invalid("PERF_MAX_VIOLATIONS", "must be at least 1"));
    }

    // A zero-sample baseline makes every degradation ratio meaningless
    if config.min_baseline_samples == 0 {
        return Err(invalid("PERF_MIN_BASELINE_SAMPLES", "must be at least 1"));
    }

    if config.max_pending_events == 0 {
        return Err(invalid("PERF_MAX_PENDING_EVENTS", "must be at least 1"));
    }

    Ok(())
}

fn check_interval(var: &str, value_ms: u64) -> Result<(), ConfigError> {
    if (MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&value_ms) {
        Ok(())
    } else {
        Err(invalid(
            var,
            format!("must be between {MIN_INTERVAL_MS} and {MAX_INTERVAL_MS} ms"),
        ))
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.into(),
        reason: reason.into(),
    }
}
