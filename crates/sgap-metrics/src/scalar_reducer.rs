// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-trial accuracy scalars: FORG, ACC, min-ACC and WC-ACC

use serde::Serialize;

use crate::error::Result;
use crate::performance_log::PerformanceLog;
use crate::stats::nan_mean;

/// Accuracy-level scalars of one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyScalars {
    /// Mean drop from end-of-training to final accuracy over earlier tasks
    pub forgetting: f64,
    /// Mean final accuracy over all tasks
    pub accuracy: f64,
    /// Mean post-training minimum over earlier tasks
    pub min_accuracy: f64,
    /// Worst-case accuracy blend of `min_accuracy` and last-task accuracy
    pub worst_case_accuracy: f64,
}

/// Reduce a trial's log to its accuracy scalars
pub fn reduce_accuracy(log: &PerformanceLog) -> Result<AccuracyScalars> {
    let n_tasks = log.n_tasks();

    let mut forgetting = Vec::with_capacity(n_tasks - 1);
    let mut minima = Vec::with_capacity(n_tasks - 1);
    for task in log.earlier_tasks() {
        forgetting.push(log.end_of_training(task)? - log.final_accuracy(task)?);
        minima.push(
            log.post_training(task)?
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min),
        );
    }

    let finals = (0..n_tasks)
        .map(|task| log.final_accuracy(task))
        .collect::<Result<Vec<_>>>()?;
    let last_final = finals[n_tasks - 1];

    let min_accuracy = nan_mean(&minima);
    let share = 1.0 / n_tasks as f64;

    Ok(AccuracyScalars {
        forgetting: nan_mean(&forgetting),
        accuracy: nan_mean(&finals),
        min_accuracy,
        worst_case_accuracy: min_accuracy * (1.0 - share) + last_final * share,
    })
}
