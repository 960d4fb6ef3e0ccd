// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! The thirteen reported scalars

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one reported scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "FORG")]
    Forgetting,
    #[serde(rename = "ACC")]
    Accuracy,
    #[serde(rename = "min_ACC")]
    MinAccuracy,
    #[serde(rename = "WC_ACC")]
    WorstCaseAccuracy,
    #[serde(rename = "WF10")]
    Wf10,
    #[serde(rename = "WF100")]
    Wf100,
    #[serde(rename = "WP10")]
    Wp10,
    #[serde(rename = "WP100")]
    Wp100,
    #[serde(rename = "TBP")]
    TimeBeforeRecovery,
    #[serde(rename = "GD")]
    GapDepth,
    #[serde(rename = "SD")]
    SlopeDown,
    #[serde(rename = "SR_fixed")]
    SlopeRecoveryFixed,
    #[serde(rename = "SR")]
    SlopeRecovery,
}

impl Metric {
    /// Every metric in report order
    pub const ALL: [Metric; 13] = [
        Metric::Forgetting,
        Metric::Accuracy,
        Metric::MinAccuracy,
        Metric::WorstCaseAccuracy,
        Metric::Wf10,
        Metric::Wf100,
        Metric::Wp10,
        Metric::Wp100,
        Metric::TimeBeforeRecovery,
        Metric::GapDepth,
        Metric::SlopeDown,
        Metric::SlopeRecoveryFixed,
        Metric::SlopeRecovery,
    ];

    /// Label used in rendered reports
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Forgetting => "FORG",
            Metric::Accuracy => "ACC",
            Metric::MinAccuracy => "min-ACC",
            Metric::WorstCaseAccuracy => "WC-ACC",
            Metric::Wf10 => "WF10",
            Metric::Wf100 => "WF100",
            Metric::Wp10 => "WP10",
            Metric::Wp100 => "WP100",
            Metric::TimeBeforeRecovery => "TBP",
            Metric::GapDepth => "GD",
            Metric::SlopeDown => "SD",
            Metric::SlopeRecoveryFixed => "SRfixed",
            Metric::SlopeRecovery => "SRfull",
        }
    }

    /// Decimal places shown for this metric
    pub fn display_precision(&self) -> usize {
        match self {
            Metric::TimeBeforeRecovery => 1,
            Metric::SlopeDown | Metric::SlopeRecovery | Metric::SlopeRecoveryFixed => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-trial values of every metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarMetrics {
    #[serde(rename = "FORG")]
    pub forg: f64,
    #[serde(rename = "ACC")]
    pub acc: f64,
    #[serde(rename = "min_ACC")]
    pub min_acc: f64,
    #[serde(rename = "WC_ACC")]
    pub wc_acc: f64,
    #[serde(rename = "WF10")]
    pub wf10: f64,
    #[serde(rename = "WF100")]
    pub wf100: f64,
    #[serde(rename = "WP10")]
    pub wp10: f64,
    #[serde(rename = "WP100")]
    pub wp100: f64,
    #[serde(rename = "TBP")]
    pub tbp: f64,
    #[serde(rename = "SD")]
    pub sd: f64,
    #[serde(rename = "SR")]
    pub sr: f64,
    #[serde(rename = "SR_fixed")]
    pub sr_fixed: f64,
    #[serde(rename = "GD")]
    pub gd: f64,
}

impl ScalarMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Forgetting => self.forg,
            Metric::Accuracy => self.acc,
            Metric::MinAccuracy => self.min_acc,
            Metric::WorstCaseAccuracy => self.wc_acc,
            Metric::Wf10 => self.wf10,
            Metric::Wf100 => self.wf100,
            Metric::Wp10 => self.wp10,
            Metric::Wp100 => self.wp100,
            Metric::TimeBeforeRecovery => self.tbp,
            Metric::GapDepth => self.gd,
            Metric::SlopeDown => self.sd,
            Metric::SlopeRecoveryFixed => self.sr_fixed,
            Metric::SlopeRecovery => self.sr,
        }
    }

    /// Metrics whose value is NaN in this trial
    pub fn undefined(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| self.get(*m).is_nan())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_unique() {
        let mut labels: Vec<&str> = Metric::ALL.iter().map(Metric::label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), 13);
    }

    #[test]
    fn test_precision() {
        assert_eq!(Metric::TimeBeforeRecovery.display_precision(), 1);
        assert_eq!(Metric::SlopeRecovery.display_precision(), 3);
        assert_eq!(Metric::Forgetting.display_precision(), 2);
    }

    #[test]
    fn test_get_and_undefined() {
        let m = ScalarMetrics {
            forg: 1.0,
            acc: 2.0,
            min_acc: 3.0,
            wc_acc: 4.0,
            wf10: 5.0,
            wf100: 6.0,
            wp10: 7.0,
            wp100: 8.0,
            tbp: 9.0,
            sd: 10.0,
            sr: f64::NAN,
            sr_fixed: 12.0,
            gd: 13.0,
        };
        assert_eq!(m.get(Metric::GapDepth), 13.0);
        assert_eq!(m.get(Metric::SlopeDown), 10.0);
        assert_eq!(m.undefined(), vec![Metric::SlopeRecovery]);
    }
}
