//! Error types for the performance monitoring engine.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`ConfigError`]: Configuration errors
//! - [`BaselineError`]: Baseline capture validation errors
//! - [`ExportError`]: Report export errors
//! - [`ServiceError`]: Background service communication errors
//!
//! Most engine operations cannot fail: missing signals are skipped and
//! unknown alert ids are no-ops. Only the cases above surface as errors.
//!
//! All errors implement `Send + Sync` for async compatibility.

use thiserror::Error;

/// Top-level application error.
///
/// Wraps all subsystem errors for unified handling in the binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Baseline error.
    #[error("Baseline error: {0}")]
    Baseline(#[from] BaselineError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Service error.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Terminal I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}

/// Baseline capture errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BaselineError {
    /// Too few samples have been observed for a meaningful baseline.
    #[error("Insufficient samples for baseline: need {required}, have {actual}")]
    InsufficientSamples {
        /// Minimum number of samples required.
        required: u64,
        /// Samples observed so far.
        actual: u64,
    },
}

/// Report export errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The report could not be serialized.
    #[error("Serialization failed: {message}")]
    Serialization {
        /// Description of the failure.
        message: String,
    },

    /// The report could not be written.
    #[error("Write failed for {path}: {message}")]
    Write {
        /// Destination path.
        path: String,
        /// Description of the failure.
        message: String,
    },
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

/// Background service errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service task is not running.
    #[error("Monitor service not running")]
    NotRunning,

    /// The service dropped the reply channel.
    #[error("Monitor service disconnected")]
    Disconnected,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(AppError: Send, Sync, std::error::Error);
    assert_impl_all!(ConfigError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(BaselineError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(ExportError: Send, Sync, std::error::Error, Clone);
    assert_impl_all!(ServiceError: Send, Sync, std::error::Error, Clone);

    #[test]
    fn test_app_error_display_config() {
        let err = AppError::Config(ConfigError::InvalidValue {
            var: "PERF_MAX_DATA_POINTS".to_string(),
            reason: "must be at least 2".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for PERF_MAX_DATA_POINTS: must be at least 2"
        );
    }

    #[test]
    fn test_app_error_display_baseline() {
        let err = AppError::Baseline(BaselineError::InsufficientSamples {
            required: 5,
            actual: 0,
        });
        assert_eq!(
            err.to_string(),
            "Baseline error: Insufficient samples for baseline: need 5, have 0"
        );
    }

    #[test]
    fn test_app_error_display_service() {
        let err = AppError::Service(ServiceError::NotRunning);
        assert_eq!(err.to_string(), "Service error: Monitor service not running");
    }

    #[test]
    fn test_app_error_from_export_error() {
        let export_err = ExportError::Write {
            path: "/nope/report.json".to_string(),
            message: "permission denied".to_string(),
        };
        let app_err: AppError = export_err.into();
        assert!(matches!(app_err, AppError::Export(_)));
    }

    #[test]
    fn test_app_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdin closed");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_export_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ExportError = json_err.into();
        assert!(matches!(err, ExportError::Serialization { .. }));
    }

    #[test]
    fn test_export_error_display_write() {
        let err = ExportError::Write {
            path: "out.json".to_string(),
            message: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "Write failed for out.json: disk full");
    }
}
