// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Metrics engine - runs every trial and aggregates the results
//!
//! Trials are independent end to end and are analysed on the rayon pool
//! when `parallel` is set. Results are joined in trial order before the
//! single-threaded aggregation fold. A trial that fails upstream or fails
//! its own preconditions is excluded whole; nothing it computed reaches
//! the report.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregator::{aggregate, AggregateReport, ExcludedTrial};
use crate::config::EngineConfig;
use crate::error::{MetricsError, Result};
use crate::learning_curve::{learning_curves, LearningCurve};
use crate::performance_log::PerformanceLog;
use crate::trial::{analyze_trial, TrialMetrics};

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOutput {
    pub report: AggregateReport,
    /// Admitted trials in trial order
    pub trials: Vec<TrialMetrics>,
    /// Per-task cross-trial curves over admitted trials
    pub curves: Vec<LearningCurve>,
}

/// Entry point of the metrics core
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    config: EngineConfig,
}

impl MetricsEngine {
    /// Create an engine, checking the run shape first
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyse one trial without aggregating
    pub fn analyze(&self, trial: usize, log: &PerformanceLog) -> Result<TrialMetrics> {
        analyze_trial(trial, log, &self.config)
    }

    fn analyze_outcome<'a>(
        &self,
        trial: usize,
        outcome: &Result<&'a PerformanceLog>,
    ) -> Result<(TrialMetrics, &'a PerformanceLog)> {
        match outcome {
            Ok(log) => analyze_trial(trial, log, &self.config).map(|metrics| (metrics, *log)),
            Err(err) => Err(err.clone()),
        }
    }

    /// Run over complete logs
    pub fn run(&self, logs: &[PerformanceLog]) -> Result<EngineOutput> {
        let outcomes: Vec<Result<&PerformanceLog>> = logs.iter().map(Ok).collect();
        self.run_outcomes(outcomes)
    }

    /// Run over raw per-trial rows, excluding trials whose rows do not form a valid log
    pub fn run_rows(&self, trials: Vec<Vec<Vec<f64>>>) -> Result<EngineOutput> {
        let logs: Vec<Result<PerformanceLog>> = trials
            .into_iter()
            .map(|rows| PerformanceLog::new(self.config.iters, rows))
            .collect();
        let outcomes = logs.iter().map(|r| r.as_ref().map_err(Clone::clone)).collect();
        self.run_outcomes(outcomes)
    }

    /// Run over trial outcomes; `Err` entries are trials that failed upstream
    ///
    /// # Errors
    ///
    /// `MetricsError::InvalidExperimentCount` for an empty batch,
    /// `MetricsError::NoValidTrials` when every trial is excluded.
    pub fn run_outcomes(&self, outcomes: Vec<Result<&PerformanceLog>>) -> Result<EngineOutput> {
        if outcomes.is_empty() {
            return Err(MetricsError::InvalidExperimentCount);
        }
        let attempted = outcomes.len();
        debug!(
            trials = attempted,
            iters = self.config.iters,
            n_tasks = self.config.n_tasks,
            parallel = self.config.parallel,
            "analysing trials"
        );

        let results: Vec<(usize, Result<(TrialMetrics, &PerformanceLog)>)> = if self.config.parallel
        {
            outcomes
                .par_iter()
                .enumerate()
                .map(|(trial, outcome)| (trial, self.analyze_outcome(trial, outcome)))
                .collect()
        } else {
            outcomes
                .iter()
                .enumerate()
                .map(|(trial, outcome)| (trial, self.analyze_outcome(trial, outcome)))
                .collect()
        };

        let mut trials = Vec::with_capacity(attempted);
        let mut admitted_logs = Vec::with_capacity(attempted);
        let mut excluded = Vec::new();

        for (trial, result) in results {
            match result {
                Ok((metrics, log)) => {
                    trials.push(metrics);
                    admitted_logs.push(log);
                }
                Err(err) => {
                    warn!(trial, error = %err, "excluding trial from aggregate");
                    excluded.push(ExcludedTrial {
                        trial,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let report = aggregate(&trials, excluded)?;
        let curves = learning_curves(&admitted_logs)?;

        info!(
            trials_used = report.trials_used,
            trials_attempted = report.trials_attempted,
            "stability-gap metrics aggregated"
        );

        Ok(EngineOutput {
            report,
            trials,
            curves,
        })
    }
}
