//! Performance Sentinel
//!
//! A performance monitoring and regression-detection engine. It samples
//! runtime signals, keeps bounded per-metric history with trend
//! classification, profiles named render operations against budgets,
//! captures an operator-chosen baseline, and raises classified alerts when
//! live metrics degrade relative to it.
//!
//! # Features
//!
//! - Rolling history with up/down/stable trends
//! - Per-operation render profiling with budget violations
//! - Baseline capture and warning/critical regression alerts
//! - Alert acknowledgment lifecycle
//! - JSON report export
//! - Background service with cancellable refresh and check ticks
//!
//! # Quick Start
//!
//! ```bash
//! echo '{"type":"render","name":"Grid","durationMs":12}' | ./perf-sentinel
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   JSON lines   ┌─────────────────┐
//! │  Producers  │───────────────▶│  MonitorService │──────▶ performance-report-*.json
//! │  / keys     │                │  (tokio task)   │
//! └─────────────┘                └────────┬────────┘
//!                                         │ owns
//!                                         ▼
//!                                 PerformanceMonitor
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod input;
pub mod metrics;
pub mod monitor;
pub mod report;
pub mod service;
pub mod traits;
