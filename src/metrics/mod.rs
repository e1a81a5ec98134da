//! Metrics collection.
//!
//! This module provides:
//! - [`MetricSample`] and [`MetricSampler`]: normalized observations
//! - [`RollingHistory`]: bounded per-metric series with trend classification
//! - [`HookProfileAggregator`]: per-operation render statistics and budget violations
//! - [`ProcessMemorySource`]: a procfs-backed memory source
//!
//! # Example
//!
//! ```
//! use perf_sentinel::metrics::{RollingHistory, Trend};
//!
//! let mut history = RollingHistory::new(4);
//! for value in [10.0, 12.0, 30.0, 40.0, 50.0] {
//!     history.add_data_point("fcp", value);
//! }
//!
//! // Capacity is respected; the oldest value was evicted
//! assert_eq!(history.values("fcp"), vec![12.0, 30.0, 40.0, 50.0]);
//! assert_eq!(history.trend("fcp"), Trend::Up);
//! ```

mod history;
mod profiler;
mod sample;
mod source;

pub use history::{RollingHistory, Trend};
pub use profiler::{BudgetViolation, HookMetrics, HookProfileAggregator};
pub use sample::{names, MetricSample, MetricSampler, Unit};
pub use source::ProcessMemorySource;
