// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Windowed forgetting and plasticity
//!
//! Walks the post-training tail of a task row and, for every new sample,
//! compares it against the trailing `W` samples before it:
//! - WF\[W\]: largest `earlier - current` drop seen so far
//! - WP\[W\]: largest `current - earlier` rise seen so far
//!
//! Trailing maxima and minima are kept in monotonic deques, so a scan is
//! linear in the tail length regardless of `W`.

use serde::Serialize;
use std::collections::VecDeque;

use crate::error::{MetricsError, Result};
use crate::performance_log::PerformanceLog;
use crate::stats::nan_mean_columns;

/// Short trailing window
pub const SHORT_WINDOW: usize = 10;

/// Long trailing window
pub const LONG_WINDOW: usize = 100;

/// Running WF/WP maxima over one trailing window size
#[derive(Debug, Clone)]
pub struct TrailingExtremumScanner {
    window: usize,
    seen: usize,
    // (sample index, value), values decreasing front to back
    maxima: VecDeque<(usize, f64)>,
    // (sample index, value), values increasing front to back
    minima: VecDeque<(usize, f64)>,
    max_forgetting: f64,
    max_plasticity: f64,
}

impl TrailingExtremumScanner {
    /// Scanner comparing each sample against up to `window` previous samples
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            seen: 0,
            maxima: VecDeque::with_capacity(window),
            minima: VecDeque::with_capacity(window),
            max_forgetting: f64::NEG_INFINITY,
            max_plasticity: f64::NEG_INFINITY,
        }
    }

    /// Feed the next sample
    ///
    /// The first sample only seeds the trailing window.
    pub fn observe(&mut self, value: f64) {
        if let (Some(&(_, high)), Some(&(_, low))) = (self.maxima.front(), self.minima.front()) {
            self.max_forgetting = self.max_forgetting.max(high - value);
            self.max_plasticity = self.max_plasticity.max(value - low);
        }

        let index = self.seen;
        self.seen += 1;

        while matches!(self.maxima.back(), Some(&(_, v)) if v <= value) {
            self.maxima.pop_back();
        }
        self.maxima.push_back((index, value));

        while matches!(self.minima.back(), Some(&(_, v)) if v >= value) {
            self.minima.pop_back();
        }
        self.minima.push_back((index, value));

        // Keep indices within the last `window` samples
        while matches!(self.maxima.front(), Some(&(i, _)) if i + self.window <= index) {
            self.maxima.pop_front();
        }
        while matches!(self.minima.front(), Some(&(i, _)) if i + self.window <= index) {
            self.minima.pop_front();
        }
    }

    /// Largest drop so far, negative infinity before any comparison
    pub fn max_forgetting(&self) -> f64 {
        self.max_forgetting
    }

    /// Largest rise so far, negative infinity before any comparison
    pub fn max_plasticity(&self) -> f64 {
        self.max_plasticity
    }
}

/// WF/WP of one task for both window sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowExtrema {
    pub wf10: f64,
    pub wf100: f64,
    pub wp10: f64,
    pub wp100: f64,
}

impl WindowExtrema {
    /// `[WF10, WF100, WP10, WP100]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.wf10, self.wf100, self.wp10, self.wp100]
    }

    pub fn from_array(values: [f64; 4]) -> Self {
        Self {
            wf10: values[0],
            wf100: values[1],
            wp10: values[2],
            wp100: values[3],
        }
    }

    /// Elementwise NaN-aware mean over tasks
    pub fn nan_mean_of(extrema: &[WindowExtrema]) -> Self {
        let rows: Vec<[f64; 4]> = extrema.iter().map(Self::to_array).collect();
        Self::from_array(nan_mean_columns(&rows))
    }
}

/// Scan a post-training tail with both window sizes
///
/// # Errors
///
/// `MetricsError::EmptySequence` when the tail is empty.
pub fn scan_tail(tail: &[f64]) -> Result<WindowExtrema> {
    if tail.is_empty() {
        return Err(MetricsError::EmptySequence);
    }

    let mut short = TrailingExtremumScanner::new(SHORT_WINDOW);
    let mut long = TrailingExtremumScanner::new(LONG_WINDOW);
    for &value in tail {
        short.observe(value);
        long.observe(value);
    }

    Ok(WindowExtrema {
        wf10: short.max_forgetting(),
        wf100: long.max_forgetting(),
        wp10: short.max_plasticity(),
        wp100: long.max_plasticity(),
    })
}

/// Scan the samples of `task` recorded after its own training window
pub fn scan_task(log: &PerformanceLog, task: usize) -> Result<WindowExtrema> {
    scan_tail(log.post_training(task)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quadratic comparison over every earlier sample in the window
    fn brute_force(tail: &[f64], window: usize) -> (f64, f64) {
        let mut wf = f64::NEG_INFINITY;
        let mut wp = f64::NEG_INFINITY;
        for i in 1..tail.len() {
            let lo = i.saturating_sub(window);
            for &earlier in &tail[lo..i] {
                wf = wf.max(earlier - tail[i]);
                wp = wp.max(tail[i] - earlier);
            }
        }
        (wf, wp)
    }

    fn wiggly(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| 80.0 + ((i * 37) % 23) as f64 * 0.5 - ((i * 11) % 7) as f64)
            .collect()
    }

    #[test]
    fn test_matches_brute_force() {
        let tail = wiggly(400);
        for window in [1, 3, SHORT_WINDOW, LONG_WINDOW] {
            let mut scanner = TrailingExtremumScanner::new(window);
            for &v in &tail {
                scanner.observe(v);
            }
            let (wf, wp) = brute_force(&tail, window);
            assert_eq!(scanner.max_forgetting(), wf, "WF window {}", window);
            assert_eq!(scanner.max_plasticity(), wp, "WP window {}", window);
        }
    }

    #[test]
    fn test_running_maxima_never_decrease() {
        let tail = wiggly(300);
        let mut scanner = TrailingExtremumScanner::new(SHORT_WINDOW);
        let mut last = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &v in &tail {
            scanner.observe(v);
            assert!(scanner.max_forgetting() >= last.0);
            assert!(scanner.max_plasticity() >= last.1);
            last = (scanner.max_forgetting(), scanner.max_plasticity());
        }
    }

    #[test]
    fn test_window_limits_reach() {
        // A drop 20 samples after the peak is invisible to the short window
        let mut tail = vec![90.0];
        tail.extend(vec![85.0; 19]);
        tail.push(70.0);
        let extrema = scan_tail(&tail).unwrap();
        assert_eq!(extrema.wf10, 15.0);
        assert_eq!(extrema.wf100, 20.0);
        assert_eq!(extrema.wp10, 0.0);
    }

    #[test]
    fn test_single_sample_has_no_comparison() {
        let extrema = scan_tail(&[50.0]).unwrap();
        assert_eq!(extrema.wf10, f64::NEG_INFINITY);
        assert_eq!(extrema.wp100, f64::NEG_INFINITY);
    }

    #[test]
    fn test_constant_tail_is_zero() {
        let extrema = scan_tail(&vec![88.0; 50]).unwrap();
        assert_eq!(extrema.to_array(), [0.0; 4]);
    }

    #[test]
    fn test_empty_tail_rejected() {
        assert_eq!(scan_tail(&[]), Err(MetricsError::EmptySequence));
    }
}
