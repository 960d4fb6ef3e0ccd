// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! # Stability-Gap Metrics
//!
//! Quantifies the stability gap of continual-learning runs: the transient
//! accuracy drop on earlier tasks right after a task switch, and how fast
//! it recovers. Input is one [`PerformanceLog`] per trial; output is an
//! [`AggregateReport`] of 13 scalar metrics (mean and standard error
//! across trials).
//!
//! ## Per-trial analyses
//! - Trough/recovery (TBP, SD, SR, SR_fixed, GD) on a smoothed window after
//!   each switch
//! - Windowed forgetting and plasticity (WF10, WF100, WP10, WP100)
//! - Accuracy scalars (FORG, ACC, min-ACC, WC-ACC)
//!
//! Trials and per-task windows are independent and run on the rayon pool;
//! aggregation is a single-threaded fold in trial order.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod aggregator;
pub mod config;
pub mod engine;
pub mod error;
pub mod learning_curve;
pub mod metric;
pub mod performance_log;
pub mod report;
pub mod scalar_reducer;
pub mod sliding_extremum;
pub mod smoothing;
pub mod stats;
pub mod trial;
pub mod trough_recovery;

// Re-export key types
pub use aggregator::{aggregate, AggregateReport, ExcludedTrial};
pub use config::{EngineConfig, TbpMode};
pub use engine::{EngineOutput, MetricsEngine};
pub use error::{MetricsError, Result};
pub use learning_curve::{learning_curves, LearningCurve};
pub use metric::{Metric, ScalarMetrics};
pub use performance_log::{PerformanceLog, PerformanceRecorder, BASELINE_LEN, MIN_ITERS};
pub use report::ReportFormatter;
pub use scalar_reducer::{reduce_accuracy, AccuracyScalars};
pub use sliding_extremum::{scan_tail, scan_task, TrailingExtremumScanner, WindowExtrema};
pub use smoothing::{smooth, smooth_window, SMOOTHING_RADIUS};
pub use stats::MetricSummary;
pub use trial::{analyze_trial, TrialMetrics};
pub use trough_recovery::{
    analyze_task, analyze_window, DropRecoveryMetrics, DropRecoverySummary, TaskDropRecovery,
};
