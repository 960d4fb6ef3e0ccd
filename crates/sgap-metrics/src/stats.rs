// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! NaN-aware reductions
//!
//! Every mean in the engine goes through [`nan_mean`]: NaN entries are
//! skipped, and a reduction over nothing but NaN yields NaN.

use serde::Serialize;

/// Mean of the non-NaN values. NaN when every value is NaN or the slice is empty.
///
/// Accumulates offsets from the first valid value, so a run of identical
/// values averages to exactly that value.
pub fn nan_mean(values: &[f64]) -> f64 {
    let mut valid = values.iter().copied().filter(|v| !v.is_nan());
    let Some(pivot) = valid.next() else {
        return f64::NAN;
    };
    if !pivot.is_finite() {
        let (sum, count) = valid.fold((pivot, 1_usize), |(sum, count), v| (sum + v, count + 1));
        return sum / count as f64;
    }

    let (offset_sum, count) = valid.fold((0.0_f64, 1_usize), |(sum, count), v| {
        (sum + (v - pivot), count + 1)
    });
    pivot + offset_sum / count as f64
}

/// Delta degrees of freedom for a sample of `n` values
///
/// Sample correction (1) when more than one value exists, population (0)
/// otherwise.
pub fn ddof_for(n: usize) -> usize {
    if n > 1 {
        1
    } else {
        0
    }
}

/// NaN-aware standard deviation with explicit `ddof`
pub fn nan_std(values: &[f64], ddof: usize) -> f64 {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.len() <= ddof {
        return f64::NAN;
    }

    let mean = nan_mean(&valid);
    let sum_sq: f64 = valid.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum_sq / (valid.len() - ddof) as f64).sqrt()
}

/// Standard error of the mean over the non-NaN values
pub fn standard_error(values: &[f64]) -> f64 {
    let n = values.iter().filter(|v| !v.is_nan()).count();
    if n == 0 {
        return f64::NAN;
    }
    nan_std(values, ddof_for(n)) / (n as f64).sqrt()
}

/// Elementwise NaN-aware mean over equally sized rows
///
/// Every column is NaN when `rows` is empty.
pub fn nan_mean_columns<const N: usize>(rows: &[[f64; N]]) -> [f64; N] {
    let mut out = [f64::NAN; N];
    let mut column = Vec::with_capacity(rows.len());
    for (i, slot) in out.iter_mut().enumerate() {
        column.clear();
        column.extend(rows.iter().map(|row| row[i]));
        *slot = nan_mean(&column);
    }
    out
}

/// Mean and standard error of one metric across trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub standard_error: f64,
    /// Number of trials whose value for this metric was not NaN
    pub samples: usize,
}

impl MetricSummary {
    /// Summarise per-trial values of a single metric
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            mean: nan_mean(values),
            standard_error: standard_error(values),
            samples: values.iter().filter(|v| !v.is_nan()).count(),
        }
    }

    /// True when no trial produced a defined value
    pub fn is_undefined(&self) -> bool {
        self.samples == 0
    }
}
