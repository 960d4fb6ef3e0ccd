// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Centered moving-average filter
//!
//! Neighborhoods are truncated at the sequence edges: a boundary value is the
//! mean of the real samples within reach, never padded or reflected.

use crate::error::{MetricsError, Result};

/// Radius used for post-switch windows (5-sample neighborhood)
pub const SMOOTHING_RADIUS: usize = 2;

/// Mean of a non-empty span, accumulated as offsets from its first sample
///
/// A span of identical values averages to exactly that value.
fn span_mean(span: &[f64]) -> f64 {
    let pivot = span[0];
    if !pivot.is_finite() {
        return span.iter().sum::<f64>() / span.len() as f64;
    }
    let offsets: f64 = span.iter().map(|v| v - pivot).sum();
    pivot + offsets / span.len() as f64
}

/// Smooth `samples` with a truncated centered mean of the given radius
///
/// # Errors
///
/// Returns `MetricsError::EmptySequence` for empty input.
pub fn smooth(samples: &[f64], radius: usize) -> Result<Vec<f64>> {
    if samples.is_empty() {
        return Err(MetricsError::EmptySequence);
    }

    let len = samples.len();
    let smoothed = (0..len)
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(len);
            span_mean(&samples[lo..hi])
        })
        .collect();

    Ok(smoothed)
}

/// Smooth with the fixed window radius
pub fn smooth_window(window: &[f64]) -> Result<Vec<f64>> {
    smooth(window, SMOOTHING_RADIUS)
}
