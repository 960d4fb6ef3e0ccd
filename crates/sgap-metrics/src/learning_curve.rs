// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-iteration accuracy curves averaged across trials
//!
//! Each task's curve spans the whole run (`iters * n_tasks` points). Points
//! before the task was introduced are NaN.

use serde::Serialize;

use crate::error::{MetricsError, Result};
use crate::performance_log::PerformanceLog;
use crate::stats::{nan_mean, standard_error};

/// Cross-trial mean and standard error of one task's trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningCurve {
    pub task: usize,
    /// Global iteration at which the task's samples begin
    pub first_iteration: usize,
    pub mean: Vec<f64>,
    pub standard_error: Vec<f64>,
}

impl LearningCurve {
    /// Number of points (the full run length)
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Defined points as `(global_iteration, mean, standard_error)`
    pub fn points(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.mean
            .iter()
            .zip(&self.standard_error)
            .enumerate()
            .skip(self.first_iteration)
            .map(|(i, (&m, &se))| (i, m, se))
    }
}

/// Build one curve per task from logs of identical shape
///
/// # Errors
///
/// `MetricsError::NoValidTrials` for an empty batch, `MetricsError::LogShape`
/// when logs disagree on `iters` or `n_tasks`.
pub fn learning_curves(logs: &[&PerformanceLog]) -> Result<Vec<LearningCurve>> {
    let first = logs
        .first()
        .ok_or(MetricsError::NoValidTrials { attempted: 0 })?;
    let iters = first.iters();
    let n_tasks = first.n_tasks();

    if let Some(other) = logs
        .iter()
        .find(|log| log.iters() != iters || log.n_tasks() != n_tasks)
    {
        return Err(MetricsError::LogShape {
            expected_iters: iters,
            expected_tasks: n_tasks,
            actual_iters: other.iters(),
            actual_tasks: other.n_tasks(),
        });
    }

    let total = iters * n_tasks;
    let mut column = Vec::with_capacity(logs.len());
    let mut curves = Vec::with_capacity(n_tasks);

    for task in 0..n_tasks {
        let first_iteration = iters * task;
        let mut mean = vec![f64::NAN; total];
        let mut se = vec![f64::NAN; total];

        let rows = logs
            .iter()
            .map(|log| log.row(task))
            .collect::<Result<Vec<_>>>()?;

        for offset in 0..total - first_iteration {
            column.clear();
            column.extend(rows.iter().map(|row| row[offset]));
            mean[first_iteration + offset] = nan_mean(&column);
            se[first_iteration + offset] = standard_error(&column);
        }

        curves.push(LearningCurve {
            task,
            first_iteration,
            mean,
            standard_error: se,
        });
    }

    Ok(curves)
}
