// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Text rendering of an aggregate report
//!
//! Rounding happens here only; the report itself keeps full precision.

use std::fmt;

use crate::aggregator::AggregateReport;
use crate::metric::Metric;

/// Renders `LABEL: mean (+/-se)` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFormatter {
    /// Decimal places for every metric; per-metric defaults when `None`
    pub precision: Option<usize>,
}

impl ReportFormatter {
    pub fn new(precision: Option<usize>) -> Self {
        Self { precision }
    }

    fn precision_for(&self, metric: Metric) -> usize {
        self.precision.unwrap_or_else(|| metric.display_precision())
    }

    /// One line for one metric
    pub fn format_metric(&self, report: &AggregateReport, metric: Metric) -> String {
        let summary = report.get(metric);
        let p = self.precision_for(metric);
        format!(
            "{}: {:.*} (+/-{:.*})",
            metric.label(),
            p,
            summary.mean,
            p,
            summary.standard_error
        )
    }

    /// Full multi-line summary
    pub fn render(&self, report: &AggregateReport) -> String {
        let mut lines = Vec::with_capacity(Metric::ALL.len() + 2 + report.excluded.len());

        if report.is_reduced() {
            lines.push(format!(
                "Runs: {} (of {} attempted)",
                report.trials_used, report.trials_attempted
            ));
        } else {
            lines.push(format!("Runs: {}", report.trials_used));
        }

        for metric in Metric::ALL {
            lines.push(self.format_metric(report, metric));
        }

        for excluded in &report.excluded {
            lines.push(format!("Excluded trial {}: {}", excluded.trial, excluded.reason));
        }

        lines.join("\n")
    }
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ReportFormatter::default().render(self))
    }
}
