// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for metric computation
//!
//! Only precondition violations are errors. Undefined ratios (zero-length
//! slope denominators) are `f64::NAN` and flow through the NaN-aware means.

/// Result type alias using MetricsError
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Precondition violations raised before any computation proceeds
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricsError {
    /// Fewer than two tasks means no task switch exists
    #[error("Invalid task count: {n_tasks} (at least 2 tasks are required)")]
    InvalidTaskCount { n_tasks: usize },

    /// Window too short for a 5-sample baseline plus a non-degenerate window
    #[error("Invalid iterations per task: {iters} (minimum is {minimum})")]
    InvalidIterations { iters: usize, minimum: usize },

    /// At least one experiment must be requested
    #[error("Invalid experiment count: at least one trial is required")]
    InvalidExperimentCount,

    /// A task row is absent from the performance log
    #[error("Performance log has no row for task {task}")]
    MissingTask { task: usize },

    /// A task row does not hold the expected number of samples
    #[error("Task {task} row has {actual} samples, expected {expected}")]
    RowLength {
        task: usize,
        expected: usize,
        actual: usize,
    },

    /// Log recorded with a different iteration budget or task count than the run
    #[error("Performance log has iters={actual_iters}, n_tasks={actual_tasks}; run expects iters={expected_iters}, n_tasks={expected_tasks}")]
    LogShape {
        expected_iters: usize,
        expected_tasks: usize,
        actual_iters: usize,
        actual_tasks: usize,
    },

    /// An accuracy sample is NaN or infinite
    #[error("Task {task} sample {index} is not finite")]
    NonFiniteSample { task: usize, index: usize },

    /// Smoothing or reduction over an empty sequence
    #[error("Empty sequence where at least one sample is required")]
    EmptySequence,

    /// A requested window falls outside the row
    #[error("Window [{start}, {end}) of task {task} exceeds row length {len}")]
    WindowOutOfRange {
        task: usize,
        start: usize,
        end: usize,
        len: usize,
    },

    /// Samples were recorded in an order the log cannot represent
    #[error("Recording error: {0}")]
    Recording(String),

    /// Every trial was excluded, nothing to aggregate
    #[error("No valid trials to aggregate ({attempted} attempted)")]
    NoValidTrials { attempted: usize },
}

impl MetricsError {
    /// Check if error invalidates a single trial rather than the whole run
    pub fn is_trial_local(&self) -> bool {
        matches!(
            self,
            MetricsError::MissingTask { .. }
                | MetricsError::LogShape { .. }
                | MetricsError::RowLength { .. }
                | MetricsError::NonFiniteSample { .. }
                | MetricsError::EmptySequence
                | MetricsError::WindowOutOfRange { .. }
        )
    }
}
