//! Trait definitions for mockable dependencies.
//!
//! This module defines traits for:
//! - [`TimeProvider`]: Time abstraction for testing
//! - [`MetricSource`]: Sample producer polled on every refresh tick
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use perf_sentinel::traits::{ManualTimeProvider, TimeProvider};
//!
//! let clock = ManualTimeProvider::default();
//! let start = clock.now();
//! clock.advance(chrono::Duration::seconds(5));
//! assert_eq!(clock.now() - start, chrono::Duration::seconds(5));
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::metrics::MetricSample;

/// Time provider trait for mocking.
///
/// This trait abstracts time operations to allow for
/// deterministic testing with fixed timestamps.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
///
/// This is the production implementation that returns the actual current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can hand one clone to
/// the monitor and keep another to advance virtual time.
#[derive(Debug, Clone)]
pub struct ManualTimeProvider {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualTimeProvider {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Jump the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
    }
}

impl Default for ManualTimeProvider {
    fn default() -> Self {
        Self::new(Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default())
    }
}

impl TimeProvider for ManualTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A producer of runtime samples.
///
/// The monitor polls its source at the start of every refresh tick and
/// writes whatever comes back into history. A source that cannot observe a
/// signal on this platform returns nothing for it; absence is not an error.
#[cfg_attr(test, mockall::automock)]
pub trait MetricSource: Send {
    /// Collect the samples currently available.
    fn poll(&mut self) -> Vec<MetricSample>;
}

/// A source that never produces anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSource;

impl MetricSource for NullSource {
    fn poll(&mut self) -> Vec<MetricSample> {
        Vec::new()
    }
}
