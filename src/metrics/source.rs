//! Built-in sample sources.

use std::path::PathBuf;
use std::sync::Arc;

use crate::traits::{MetricSource, RealTimeProvider, TimeProvider};

use super::sample::{MetricSample, MetricSampler};

/// Page size assumed when converting `statm` pages to bytes.
const PAGE_SIZE_BYTES: u64 = 4096;

/// Reports resident memory of the current process.
///
/// Reads `/proc/self/statm`. On platforms without procfs, or when the file
/// holds an implausible page count, the source yields nothing, which drops
/// memory from the summary and from regression checks.
pub struct ProcessMemorySource {
    statm_path: PathBuf,
    clock: Arc<dyn TimeProvider>,
    unsupported_logged: bool,
}

impl ProcessMemorySource {
    /// Source reading the live process.
    #[must_use]
    pub fn new() -> Self {
        Self::with_path("/proc/self/statm", Arc::new(RealTimeProvider))
    }

    /// Source reading an arbitrary `statm`-formatted file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            statm_path: path.into(),
            clock,
            unsupported_logged: false,
        }
    }

    fn resident_bytes(&self) -> Option<u64> {
        let raw = std::fs::read_to_string(&self.statm_path).ok()?;
        parse_resident_pages(&raw)?.checked_mul(PAGE_SIZE_BYTES)
    }
}

impl Default for ProcessMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessMemorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessMemorySource")
            .field("statm_path", &self.statm_path)
            .finish_non_exhaustive()
    }
}

impl MetricSource for ProcessMemorySource {
    fn poll(&mut self) -> Vec<MetricSample> {
        match self.resident_bytes() {
            Some(bytes) => vec![MetricSampler::memory_bytes(bytes, self.clock.now())],
            None => {
                if !self.unsupported_logged {
                    tracing::debug!(
                        path = %self.statm_path.display(),
                        "Memory signal unavailable, excluding from summary"
                    );
                    self.unsupported_logged = true;
                }
                Vec::new()
            }
        }
    }
}

/// Second field of `statm` is the resident set size in pages.
fn parse_resident_pages(raw: &str) -> Option<u64> {
    raw.split_whitespace().nth(1)?.parse().ok()
}
