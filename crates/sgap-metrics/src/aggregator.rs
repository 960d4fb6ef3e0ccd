// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cross-trial aggregation
//!
//! A single-threaded fold over admitted trials in trial order, so the
//! floating-point summation order is fixed regardless of how the trials
//! were computed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MetricsError, Result};
use crate::metric::Metric;
use crate::stats::{ddof_for, MetricSummary};
use crate::trial::TrialMetrics;

/// A trial left out of the aggregate, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedTrial {
    pub trial: usize,
    pub reason: String,
}

/// Mean and standard error of every metric across admitted trials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    /// Trials requested by the run
    pub trials_attempted: usize,
    /// Trials that entered the aggregate
    pub trials_used: usize,
    /// Delta degrees of freedom applied to the standard deviation
    pub ddof: usize,
    pub metrics: BTreeMap<Metric, MetricSummary>,
    pub excluded: Vec<ExcludedTrial>,
}

impl AggregateReport {
    /// Summary of one metric
    pub fn get(&self, metric: Metric) -> MetricSummary {
        self.metrics.get(&metric).copied().unwrap_or(MetricSummary {
            mean: f64::NAN,
            standard_error: f64::NAN,
            samples: 0,
        })
    }

    /// Summaries in report order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, MetricSummary)> + '_ {
        Metric::ALL.into_iter().map(move |m| (m, self.get(m)))
    }

    /// True when fewer trials were used than requested
    pub fn is_reduced(&self) -> bool {
        self.trials_used < self.trials_attempted
    }
}

/// Reduce admitted trials to an [`AggregateReport`]
///
/// `excluded` lists trials that failed upstream; none of their values enter
/// the report.
///
/// # Errors
///
/// `MetricsError::NoValidTrials` when `trials` is empty.
pub fn aggregate(trials: &[TrialMetrics], excluded: Vec<ExcludedTrial>) -> Result<AggregateReport> {
    let trials_attempted = trials.len() + excluded.len();
    if trials.is_empty() {
        return Err(MetricsError::NoValidTrials {
            attempted: trials_attempted,
        });
    }

    let mut ordered: Vec<&TrialMetrics> = trials.iter().collect();
    ordered.sort_by_key(|t| t.trial);

    let mut values = Vec::with_capacity(ordered.len());
    let metrics = Metric::ALL
        .into_iter()
        .map(|metric| {
            values.clear();
            values.extend(ordered.iter().map(|t| t.scalars.get(metric)));
            (metric, MetricSummary::from_values(&values))
        })
        .collect();

    Ok(AggregateReport {
        trials_attempted,
        trials_used: trials.len(),
        ddof: ddof_for(trials.len()),
        metrics,
        excluded,
    })
}
