// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Trough and recovery analysis of post-switch windows
//!
//! For every task and every later task switch, the window of `iters` samples
//! following the switch is smoothed, its minimum (the trough of the stability
//! gap) is located, and the first point at which the smoothed trace regains
//! the pre-switch baseline is searched for. Slopes and depth are derived
//! from those three points.
//!
//! Undefined ratios are NaN. They stay visible in the per-window metrics and
//! are dropped by the NaN-aware means of the task and trial summaries.

use serde::Serialize;
use tracing::trace;

use crate::config::TbpMode;
use crate::error::{MetricsError, Result};
use crate::performance_log::{PerformanceLog, BASELINE_LEN};
use crate::smoothing::smooth_window;
use crate::stats::{nan_mean, nan_mean_columns};

/// Trough/recovery measurements of a single post-switch window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DropRecoveryMetrics {
    /// Position of the smoothed minimum (first one on ties)
    pub trough_index: usize,
    /// Smoothed value at the trough
    pub trough_value: f64,
    /// Mean of the 5 samples ending at the switch boundary
    pub baseline_value: f64,
    /// First index at or after the trough regaining the baseline, else `iters - 1`
    pub recovery_index: usize,
    /// Whether the baseline was actually regained inside the window
    pub recovered: bool,
    /// Capped recovery point `min(2 * distance_to_trough, iters - 1)`
    pub fixed_recovery_index: usize,
    pub slope_down: f64,
    pub slope_recovery: f64,
    pub slope_recovery_fixed: f64,
    /// Baseline minus the unsmoothed sample at the trough
    pub gap_depth: f64,
    /// Time before performance recovers
    pub tbp: f64,
}

/// NaN-aware mean of the window metrics, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DropRecoverySummary {
    pub tbp: f64,
    pub slope_down: f64,
    pub slope_recovery: f64,
    pub gap_depth: f64,
    pub slope_recovery_fixed: f64,
}

impl DropRecoverySummary {
    /// `[TBP, SD, SR, GD, SR_fixed]`
    pub fn to_array(&self) -> [f64; 5] {
        [
            self.tbp,
            self.slope_down,
            self.slope_recovery,
            self.gap_depth,
            self.slope_recovery_fixed,
        ]
    }

    pub fn from_array(values: [f64; 5]) -> Self {
        Self {
            tbp: values[0],
            slope_down: values[1],
            slope_recovery: values[2],
            gap_depth: values[3],
            slope_recovery_fixed: values[4],
        }
    }

    /// Elementwise NaN-aware mean of several summaries
    pub fn nan_mean_of(summaries: &[DropRecoverySummary]) -> Self {
        let rows: Vec<[f64; 5]> = summaries.iter().map(Self::to_array).collect();
        Self::from_array(nan_mean_columns(&rows))
    }

    fn from_windows(windows: &[DropRecoveryMetrics]) -> Self {
        let column = |f: fn(&DropRecoveryMetrics) -> f64| {
            let values: Vec<f64> = windows.iter().map(f).collect();
            nan_mean(&values)
        };

        Self {
            tbp: column(|w| w.tbp),
            slope_down: column(|w| w.slope_down),
            slope_recovery: column(|w| w.slope_recovery),
            gap_depth: column(|w| w.gap_depth),
            slope_recovery_fixed: column(|w| w.slope_recovery_fixed),
        }
    }
}

/// All windows of one task plus their mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDropRecovery {
    pub task: usize,
    pub windows: Vec<DropRecoveryMetrics>,
    pub summary: DropRecoverySummary,
}

/// Index of the first minimum
fn argmin(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v < values[best] {
            best = i;
        }
    }
    best
}

/// First index at or after `from` whose value reaches `baseline`
fn find_recovery(smoothed: &[f64], from: usize, baseline: f64) -> Option<usize> {
    smoothed[from..]
        .iter()
        .position(|&v| v >= baseline)
        .map(|offset| from + offset)
}

/// Slope between two smoothed points, NaN when they coincide
fn slope_between(smoothed: &[f64], from: usize, to: usize) -> f64 {
    if to == from {
        return f64::NAN;
    }
    (smoothed[to] - smoothed[from]) / (to - from) as f64
}

/// Analyse the window following switch `switch` (0-based) of a task row
///
/// The window is `row[iters * (switch + 1) .. iters * (switch + 2)]`; the
/// baseline averages the 5 samples ending at index `iters * (switch + 1) - 1`.
///
/// # Errors
///
/// `MetricsError::InvalidIterations` when `iters` cannot hold a baseline,
/// `MetricsError::WindowOutOfRange` when the row is too short.
pub fn analyze_window(
    row: &[f64],
    iters: usize,
    switch: usize,
    tbp_mode: TbpMode,
) -> Result<DropRecoveryMetrics> {
    if iters < BASELINE_LEN + 1 {
        return Err(MetricsError::InvalidIterations {
            iters,
            minimum: BASELINE_LEN + 1,
        });
    }

    let start = iters * (switch + 1);
    let end = start + iters;
    if end > row.len() {
        return Err(MetricsError::WindowOutOfRange {
            task: 0,
            start,
            end,
            len: row.len(),
        });
    }

    let baseline_index = start - 1;
    let baseline_value = nan_mean(&row[baseline_index + 1 - BASELINE_LEN..=baseline_index]);

    let window = &row[start..end];
    let smoothed = smooth_window(window)?;

    let trough_index = argmin(&smoothed);
    let found = find_recovery(&smoothed, trough_index, baseline_value);
    let recovery_index = found.unwrap_or(iters - 1);

    // Distance from the nominal index one before the window start
    let distance_to_trough = trough_index + 1;

    let slope_down = (smoothed[trough_index] - baseline_value) / distance_to_trough as f64;
    let slope_recovery = slope_between(&smoothed, trough_index, recovery_index);
    let gap_depth = baseline_value - window[trough_index];

    let fixed_recovery_index = (2 * distance_to_trough).min(iters - 1);
    let slope_recovery_fixed = if fixed_recovery_index <= recovery_index {
        (smoothed[fixed_recovery_index] - smoothed[trough_index]) / distance_to_trough as f64
    } else {
        slope_recovery
    };

    let tbp = match tbp_mode {
        TbpMode::RecoveryDistance => (recovery_index - trough_index) as f64,
        // The scan stops on the recovery index, or runs out at the window end
        TbpMode::RecoveryIndex => recovery_index as f64,
    };

    trace!(
        switch,
        trough_index,
        trough_value = smoothed[trough_index],
        recovery_index,
        recovered = found.is_some(),
        slope_recovery,
        slope_recovery_fixed,
        "analysed post-switch window"
    );

    Ok(DropRecoveryMetrics {
        trough_index,
        trough_value: smoothed[trough_index],
        baseline_value,
        recovery_index,
        recovered: found.is_some(),
        fixed_recovery_index,
        slope_down,
        slope_recovery,
        slope_recovery_fixed,
        gap_depth,
        tbp,
    })
}

/// Analyse every later-switch window of `task`
pub fn analyze_task(
    log: &PerformanceLog,
    task: usize,
    tbp_mode: TbpMode,
) -> Result<TaskDropRecovery> {
    let row = log.row(task)?;
    let iters = log.iters();

    let windows = (0..log.switches_after(task))
        .map(|switch| {
            analyze_window(row, iters, switch, tbp_mode).map_err(|err| match err {
                MetricsError::WindowOutOfRange {
                    start, end, len, ..
                } => MetricsError::WindowOutOfRange {
                    task,
                    start,
                    end,
                    len,
                },
                other => other,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = DropRecoverySummary::from_windows(&windows);
    Ok(TaskDropRecovery {
        task,
        windows,
        summary,
    })
}
