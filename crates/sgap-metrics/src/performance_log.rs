// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-trial accuracy traces
//!
//! Row `t` holds one accuracy sample per training iteration, starting with
//! the iterations in which task `t` itself is trained and continuing through
//! every later task. Its length is therefore `iters * (n_tasks - t)`, and it
//! splits into `iters`-long windows: window 0 is the task's own training,
//! window `j + 1` is the training of task `t + j + 1`.
//!
//! [`PerformanceRecorder`] is the growable side used while training runs;
//! [`PerformanceLog`] is the frozen value the engine reads.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{MetricsError, Result};

/// Smallest `iters` leaving room for a 5-sample baseline and a real window
pub const MIN_ITERS: usize = 6;

/// Number of samples averaged into a switch baseline
pub const BASELINE_LEN: usize = 5;

/// Expected row length of `task` in a log with the given shape
pub fn expected_row_len(iters: usize, n_tasks: usize, task: usize) -> usize {
    iters * n_tasks.saturating_sub(task)
}

fn check_shape(iters: usize, n_tasks: usize) -> Result<()> {
    if n_tasks < 2 {
        return Err(MetricsError::InvalidTaskCount { n_tasks });
    }
    if iters < MIN_ITERS {
        return Err(MetricsError::InvalidIterations {
            iters,
            minimum: MIN_ITERS,
        });
    }
    Ok(())
}

/// Immutable accuracy log of one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPerformanceLog")]
pub struct PerformanceLog {
    iters: usize,
    rows: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawPerformanceLog {
    iters: usize,
    rows: Vec<Vec<f64>>,
}

impl TryFrom<RawPerformanceLog> for PerformanceLog {
    type Error = MetricsError;

    fn try_from(raw: RawPerformanceLog) -> Result<Self> {
        PerformanceLog::new(raw.iters, raw.rows)
    }
}

impl PerformanceLog {
    /// Build a log from complete rows, one per task
    ///
    /// # Errors
    ///
    /// Fails on fewer than two tasks, `iters < MIN_ITERS`, a row of the wrong
    /// length, or a non-finite sample.
    pub fn new(iters: usize, rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_tasks = rows.len();
        check_shape(iters, n_tasks)?;

        for (task, row) in rows.iter().enumerate() {
            let expected = expected_row_len(iters, n_tasks, task);
            if row.len() != expected {
                return Err(MetricsError::RowLength {
                    task,
                    expected,
                    actual: row.len(),
                });
            }
            if let Some(index) = row.iter().position(|v| !v.is_finite()) {
                return Err(MetricsError::NonFiniteSample { task, index });
            }
        }

        Ok(Self { iters, rows })
    }

    /// Iterations per task window
    pub fn iters(&self) -> usize {
        self.iters
    }

    /// Number of tasks, including the last one
    pub fn n_tasks(&self) -> usize {
        self.rows.len()
    }

    /// Full trace of a task
    pub fn row(&self, task: usize) -> Result<&[f64]> {
        self.rows
            .get(task)
            .map(Vec::as_slice)
            .ok_or(MetricsError::MissingTask { task })
    }

    /// All rows in task order
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Tasks that see at least one later switch (all but the last)
    pub fn earlier_tasks(&self) -> Range<usize> {
        0..self.n_tasks() - 1
    }

    /// Accuracy on `task` at the end of its own training
    pub fn end_of_training(&self, task: usize) -> Result<f64> {
        let row = self.row(task)?;
        Ok(row[self.iters - 1])
    }

    /// Last recorded accuracy on `task`
    pub fn final_accuracy(&self, task: usize) -> Result<f64> {
        let row = self.row(task)?;
        row.last().copied().ok_or(MetricsError::EmptySequence)
    }

    /// Samples of `task` recorded after its own training finished
    pub fn post_training(&self, task: usize) -> Result<&[f64]> {
        let row = self.row(task)?;
        Ok(&row[self.iters.min(row.len())..])
    }

    /// Number of later task switches that `task` lives through
    pub fn switches_after(&self, task: usize) -> usize {
        self.n_tasks().saturating_sub(task + 1)
    }
}

/// Growable recorder filled by the training loop, frozen with [`finish`](Self::finish)
#[derive(Debug, Clone)]
pub struct PerformanceRecorder {
    iters: usize,
    rows: Vec<Vec<f64>>,
    current_task: Option<usize>,
    iterations_in_task: usize,
}

impl PerformanceRecorder {
    /// Create a recorder for a run of `n_tasks` tasks with `iters` iterations each
    pub fn new(iters: usize, n_tasks: usize) -> Result<Self> {
        check_shape(iters, n_tasks)?;
        let rows = (0..n_tasks)
            .map(|task| Vec::with_capacity(expected_row_len(iters, n_tasks, task)))
            .collect();

        Ok(Self {
            iters,
            rows,
            current_task: None,
            iterations_in_task: 0,
        })
    }

    /// Task currently training, if any
    pub fn current_task(&self) -> Option<usize> {
        self.current_task
    }

    /// Move training on to `task`
    ///
    /// Tasks start in order and only after the previous one ran all its iterations.
    pub fn begin_task(&mut self, task: usize) -> Result<()> {
        let expected = match self.current_task {
            None => 0,
            Some(current) => {
                if self.iterations_in_task != self.iters {
                    return Err(MetricsError::Recording(format!(
                        "task {} ran {} of {} iterations before task {} began",
                        current, self.iterations_in_task, self.iters, task
                    )));
                }
                current + 1
            }
        };

        if task != expected || task >= self.rows.len() {
            return Err(MetricsError::Recording(format!(
                "expected task {} to begin next, got task {}",
                expected, task
            )));
        }

        self.current_task = Some(task);
        self.iterations_in_task = 0;
        Ok(())
    }

    /// Append one iteration's accuracies for tasks `0..=current_task`
    pub fn record_iteration(&mut self, accuracies: &[f64]) -> Result<()> {
        let current = self.current_task.ok_or_else(|| {
            MetricsError::Recording("no task is training".to_string())
        })?;

        if accuracies.len() != current + 1 {
            return Err(MetricsError::Recording(format!(
                "task {} training expects {} accuracies per iteration, got {}",
                current,
                current + 1,
                accuracies.len()
            )));
        }
        if self.iterations_in_task == self.iters {
            return Err(MetricsError::Recording(format!(
                "task {} already recorded {} iterations",
                current, self.iters
            )));
        }

        for (row, &accuracy) in self.rows.iter_mut().zip(accuracies) {
            row.push(accuracy);
        }
        self.iterations_in_task += 1;
        Ok(())
    }

    /// Freeze into an immutable log
    ///
    /// # Errors
    ///
    /// Fails when training stopped early or a sample is not finite.
    pub fn finish(self) -> Result<PerformanceLog> {
        PerformanceLog::new(self.iters, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_rows(iters: usize, n_tasks: usize, value: f64) -> Vec<Vec<f64>> {
        (0..n_tasks)
            .map(|t| vec![value; expected_row_len(iters, n_tasks, t)])
            .collect()
    }

    #[test]
    fn test_valid_log_shape() {
        let log = PerformanceLog::new(10, flat_rows(10, 3, 90.0)).unwrap();
        assert_eq!(log.n_tasks(), 3);
        assert_eq!(log.iters(), 10);
        assert_eq!(log.row(0).unwrap().len(), 30);
        assert_eq!(log.row(2).unwrap().len(), 10);
        assert_eq!(log.earlier_tasks(), 0..2);
        assert_eq!(log.switches_after(0), 2);
        assert_eq!(log.switches_after(2), 0);
    }

    #[test]
    fn test_single_task_rejected() {
        let err = PerformanceLog::new(10, flat_rows(10, 1, 90.0)).unwrap_err();
        assert_eq!(err, MetricsError::InvalidTaskCount { n_tasks: 1 });
    }

    #[test]
    fn test_short_iters_rejected() {
        let err = PerformanceLog::new(5, flat_rows(5, 2, 90.0)).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidIterations { iters: 5, .. }));
    }

    #[test]
    fn test_wrong_row_length_rejected() {
        let mut rows = flat_rows(10, 2, 90.0);
        rows[0].pop();
        let err = PerformanceLog::new(10, rows).unwrap_err();
        assert_eq!(
            err,
            MetricsError::RowLength {
                task: 0,
                expected: 20,
                actual: 19
            }
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut rows = flat_rows(10, 2, 90.0);
        rows[1][3] = f64::NAN;
        let err = PerformanceLog::new(10, rows).unwrap_err();
        assert_eq!(err, MetricsError::NonFiniteSample { task: 1, index: 3 });
    }

    #[test]
    fn test_accessors() {
        let mut rows = flat_rows(6, 2, 80.0);
        rows[0][5] = 99.0;
        *rows[0].last_mut().unwrap() = 70.0;
        let log = PerformanceLog::new(6, rows).unwrap();

        assert_eq!(log.end_of_training(0).unwrap(), 99.0);
        assert_eq!(log.final_accuracy(0).unwrap(), 70.0);
        assert_eq!(log.post_training(0).unwrap().len(), 6);
        assert_eq!(log.post_training(1).unwrap().len(), 0);
        assert_eq!(log.row(5), Err(MetricsError::MissingTask { task: 5 }));
    }

    #[test]
    fn test_recorder_builds_triangular_log() {
        let mut recorder = PerformanceRecorder::new(6, 3).unwrap();
        for task in 0..3 {
            recorder.begin_task(task).unwrap();
            for i in 0..6 {
                let accs: Vec<f64> = (0..=task).map(|t| (t * 100 + i) as f64).collect();
                recorder.record_iteration(&accs).unwrap();
            }
        }
        let log = recorder.finish().unwrap();

        assert_eq!(log.row(0).unwrap().len(), 18);
        assert_eq!(log.row(1).unwrap().len(), 12);
        assert_eq!(log.row(2).unwrap().len(), 6);
        assert_eq!(log.row(1).unwrap()[0], 100.0);
    }

    #[test]
    fn test_recorder_rejects_out_of_order_task() {
        let mut recorder = PerformanceRecorder::new(6, 3).unwrap();
        assert!(recorder.begin_task(1).is_err());
        recorder.begin_task(0).unwrap();
        // Task 0 has not finished its iterations
        assert!(recorder.begin_task(1).is_err());
    }

    #[test]
    fn test_recorder_rejects_wrong_width() {
        let mut recorder = PerformanceRecorder::new(6, 2).unwrap();
        assert!(recorder.record_iteration(&[1.0]).is_err());
        recorder.begin_task(0).unwrap();
        assert!(recorder.record_iteration(&[1.0, 2.0]).is_err());
        assert!(recorder.record_iteration(&[1.0]).is_ok());
    }

    #[test]
    fn test_recorder_incomplete_finish_fails() {
        let mut recorder = PerformanceRecorder::new(6, 2).unwrap();
        recorder.begin_task(0).unwrap();
        for _ in 0..6 {
            recorder.record_iteration(&[50.0]).unwrap();
        }
        let err = recorder.finish().unwrap_err();
        assert!(matches!(err, MetricsError::RowLength { task: 0, .. }));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok = r#"{"iters": 6, "rows": [[1,1,1,1,1,1,1,1,1,1,1,1],[1,1,1,1,1,1]]}"#;
        let log: PerformanceLog = serde_json::from_str(ok).unwrap();
        assert_eq!(log.n_tasks(), 2);

        let bad = r#"{"iters": 6, "rows": [[1,1,1],[1,1,1,1,1,1]]}"#;
        assert!(serde_json::from_str::<PerformanceLog>(bad).is_err());
    }
}
