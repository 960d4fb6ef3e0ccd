// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Single-trial analysis
//!
//! Runs the three per-trial analyses on one immutable [`PerformanceLog`] and
//! folds their per-task outputs into a [`ScalarMetrics`] bundle. Per-task
//! work only reads the log, so tasks may be processed on the rayon pool.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{MetricsError, Result};
use crate::metric::ScalarMetrics;
use crate::performance_log::PerformanceLog;
use crate::scalar_reducer::{reduce_accuracy, AccuracyScalars};
use crate::sliding_extremum::{scan_task, WindowExtrema};
use crate::trough_recovery::{analyze_task, DropRecoverySummary, TaskDropRecovery};

/// Everything computed for one trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialMetrics {
    /// Position of the trial in the submitted batch
    pub trial: usize,
    pub scalars: ScalarMetrics,
    pub accuracy: AccuracyScalars,
    /// Per-task WF/WP, tasks `0..n_tasks-1`
    pub task_extrema: Vec<WindowExtrema>,
    /// Per-task trough/recovery windows, tasks `0..n_tasks-1`
    pub task_drop_recovery: Vec<TaskDropRecovery>,
    /// Mean of the per-task WF/WP
    pub extrema: WindowExtrema,
    /// Mean of the per-task trough/recovery summaries
    pub drop_recovery: DropRecoverySummary,
}

fn map_tasks<T, F>(tasks: &[usize], parallel: bool, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    if parallel {
        tasks.par_iter().map(|&task| f(task)).collect()
    } else {
        tasks.iter().map(|&task| f(task)).collect()
    }
}

/// Analyse one trial's log
///
/// # Errors
///
/// `MetricsError::LogShape` when the log was recorded with a different
/// `iters` or `n_tasks` than `config`; any window precondition failure.
pub fn analyze_trial(
    trial: usize,
    log: &PerformanceLog,
    config: &EngineConfig,
) -> Result<TrialMetrics> {
    config.validate()?;
    if log.iters() != config.iters || log.n_tasks() != config.n_tasks {
        return Err(MetricsError::LogShape {
            expected_iters: config.iters,
            expected_tasks: config.n_tasks,
            actual_iters: log.iters(),
            actual_tasks: log.n_tasks(),
        });
    }

    let tasks: Vec<usize> = log.earlier_tasks().collect();

    let task_drop_recovery = map_tasks(&tasks, config.parallel, |task| {
        analyze_task(log, task, config.tbp_mode)
    })?;
    let task_extrema = map_tasks(&tasks, config.parallel, |task| scan_task(log, task))?;
    let accuracy = reduce_accuracy(log)?;

    let summaries: Vec<DropRecoverySummary> =
        task_drop_recovery.iter().map(|t| t.summary).collect();
    let drop_recovery = DropRecoverySummary::nan_mean_of(&summaries);
    let extrema = WindowExtrema::nan_mean_of(&task_extrema);

    let scalars = ScalarMetrics {
        forg: accuracy.forgetting,
        acc: accuracy.accuracy,
        min_acc: accuracy.min_accuracy,
        wc_acc: accuracy.worst_case_accuracy,
        wf10: extrema.wf10,
        wf100: extrema.wf100,
        wp10: extrema.wp10,
        wp100: extrema.wp100,
        tbp: drop_recovery.tbp,
        sd: drop_recovery.slope_down,
        sr: drop_recovery.slope_recovery,
        sr_fixed: drop_recovery.slope_recovery_fixed,
        gd: drop_recovery.gap_depth,
    };

    let undefined = scalars.undefined();
    if !undefined.is_empty() {
        debug!(trial, ?undefined, "trial has metrics with no defined window");
    }

    Ok(TrialMetrics {
        trial,
        scalars,
        accuracy,
        task_extrema,
        task_drop_recovery,
        extrema,
        drop_recovery,
    })
}
