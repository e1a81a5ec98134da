//! Bounded per-metric time series and trend classification.

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

/// Relative change between history halves that counts as a trend.
const TREND_THRESHOLD: f64 = 0.10;

/// Direction of a metric's recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Fewer than two points; nothing to compare yet.
    Collecting,
    /// Second half mean is more than 10% above the first.
    Up,
    /// Second half mean is more than 10% below the first.
    Down,
    /// Within 10% either way.
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collecting => write!(f, "collecting"),
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

/// Fixed-capacity FIFO history per metric name.
#[derive(Debug, Clone)]
pub struct RollingHistory {
    capacity: usize,
    series: HashMap<String, VecDeque<f64>>,
}

impl RollingHistory {
    /// Create an empty history; a capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: HashMap::new(),
        }
    }

    /// Capacity of every series.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a value, evicting the oldest when full.
    pub fn add_data_point(&mut self, name: &str, value: f64) {
        let capacity = self.capacity;
        let buffer = self
            .series
            .entry(name.to_string())
            .or_insert_with(|| VecDeque::with_capacity(capacity));
        if buffer.len() >= capacity {
            buffer.pop_front();
        }
        buffer.push_back(value);
    }

    /// Classify the direction of a metric's history.
    #[must_use]
    pub fn trend(&self, name: &str) -> Trend {
        let Some(buffer) = self.series.get(name) else {
            return Trend::Collecting;
        };
        if buffer.len() < 2 {
            return Trend::Collecting;
        }

        let mid = buffer.len() / 2;
        let first = mean(buffer.iter().take(mid).copied());
        let second = mean(buffer.iter().skip(mid).copied());

        let change = if first.abs() < f64::EPSILON {
            // No relative scale; any movement off zero is a trend
            if second > 0.0 {
                1.0
            } else if second < 0.0 {
                -1.0
            } else {
                0.0
            }
        } else {
            (second - first) / first.abs()
        };

        if change > TREND_THRESHOLD {
            Trend::Up
        } else if change < -TREND_THRESHOLD {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    /// Most recent value for a metric.
    #[must_use]
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.series.get(name).and_then(|b| b.back().copied())
    }

    /// Mean of a metric's buffered values.
    #[must_use]
    pub fn mean(&self, name: &str) -> Option<f64> {
        self.series
            .get(name)
            .filter(|b| !b.is_empty())
            .map(|b| mean(b.iter().copied()))
    }

    /// Buffered values, oldest first.
    #[must_use]
    pub fn values(&self, name: &str) -> Vec<f64> {
        self.series
            .get(name)
            .map(|b| b.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of buffered values for a metric.
    #[must_use]
    pub fn len(&self, name: &str) -> usize {
        self.series.get(name).map_or(0, VecDeque::len)
    }

    /// Whether no metric has any value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.values().all(VecDeque::is_empty)
    }

    /// Names of every tracked metric, sorted.
    #[must_use]
    pub fn metric_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.keys().cloned().collect();
        names.sort();
        names
    }

    /// Ordered copy of all series for export.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Vec<f64>> {
        self.series
            .iter()
            .map(|(name, buffer)| (name.clone(), buffer.iter().copied().collect()))
            .collect()
    }

    /// Drop every series.
    pub fn clear(&mut self) {
        self.series.clear();
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
