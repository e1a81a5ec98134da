//! Typed metric samples and the sampler that normalizes raw observations.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bytes per megabyte used for memory normalization.
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Well-known metric names written by producers.
pub mod names {
    /// Full page (or view) load time.
    pub const PAGE_LOAD: &str = "page_load";
    /// First contentful paint.
    pub const FCP: &str = "fcp";
    /// Time to interactive.
    pub const TTI: &str = "tti";
    /// Latency of a single user interaction.
    pub const INTERACTION: &str = "interaction";
    /// Heap / resident memory in megabytes.
    pub const MEMORY: &str = "memory";
    /// Summary-level weighted mean render time (baseline and alerts only).
    pub const AVG_RENDER_TIME: &str = "avg_render_time";
}

/// Unit of a sample's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Milliseconds.
    Ms,
    /// Megabytes.
    Mb,
    /// Raw bytes.
    Bytes,
    /// Dimensionless count.
    Count,
    /// Percentage (0-100).
    Percent,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ms => write!(f, "ms"),
            Self::Mb => write!(f, "MB"),
            Self::Bytes => write!(f, "B"),
            Self::Count => write!(f, "count"),
            Self::Percent => write!(f, "%"),
        }
    }
}

/// A single immutable observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    /// Metric name.
    pub name: String,
    /// Observed value, already normalized to `unit`.
    pub value: f64,
    /// Unit of `value`.
    pub unit: Unit,
    /// When the observation was taken.
    pub timestamp: DateTime<Utc>,
}

/// Normalizes raw observations into [`MetricSample`]s.
///
/// Every constructor rejects non-finite input by returning `None`; the
/// caller simply has nothing to record. Negative durations are clamped to
/// zero since a clock skew should not read as a negative render.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricSampler;

impl MetricSampler {
    /// Sample a measured [`Duration`] in milliseconds.
    #[must_use]
    pub fn timing(
        name: impl Into<String>,
        elapsed: Duration,
        timestamp: DateTime<Utc>,
    ) -> MetricSample {
        MetricSample {
            name: name.into(),
            value: elapsed.as_secs_f64() * 1000.0,
            unit: Unit::Ms,
            timestamp,
        }
    }

    /// Sample a raw millisecond reading.
    #[must_use]
    pub fn duration_ms(
        name: impl Into<String>,
        value_ms: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<MetricSample> {
        if !value_ms.is_finite() {
            return None;
        }
        Some(MetricSample {
            name: name.into(),
            value: value_ms.max(0.0),
            unit: Unit::Ms,
            timestamp,
        })
    }

    /// Sample memory usage, normalized from bytes to megabytes.
    #[must_use]
    pub fn memory_bytes(bytes: u64, timestamp: DateTime<Utc>) -> MetricSample {
        #[allow(clippy::cast_precision_loss)]
        let mb = bytes as f64 / BYTES_PER_MB;
        MetricSample {
            name: names::MEMORY.to_string(),
            value: mb,
            unit: Unit::Mb,
            timestamp,
        }
    }

    /// Sample a plain count.
    #[must_use]
    pub fn count(name: impl Into<String>, count: u64, timestamp: DateTime<Utc>) -> MetricSample {
        #[allow(clippy::cast_precision_loss)]
        let value = count as f64;
        MetricSample {
            name: name.into(),
            value,
            unit: Unit::Count,
            timestamp,
        }
    }

    /// Sample a named value with an explicit unit.
    ///
    /// Byte values are converted to megabytes so memory from any producer
    /// lands in history on the same scale.
    #[must_use]
    pub fn value(
        name: impl Into<String>,
        value: f64,
        unit: Unit,
        timestamp: DateTime<Utc>,
    ) -> Option<MetricSample> {
        if !value.is_finite() {
            return None;
        }
        let (value, unit) = match unit {
            Unit::Bytes => (value / BYTES_PER_MB, Unit::Mb),
            Unit::Ms => (value.max(0.0), Unit::Ms),
            other => (value, other),
        };
        Some(MetricSample {
            name: name.into(),
            value,
            unit,
            timestamp,
        })
    }
}
