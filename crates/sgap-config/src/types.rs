// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `sgap_configuration.toml`. Every field
//! has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "sgap_configuration.toml";

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SgapConfig {
    pub experiment: ExperimentConfig,
    pub analysis: AnalysisConfig,
    pub runtime: RuntimeConfig,
    pub report: ReportConfig,
}

/// Run shape: how many trials, tasks and iterations per task
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub n_experiments: usize,
    pub iters: usize,
    pub n_tasks: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_experiments: 10,
            iters: 500,
            n_tasks: 4,
        }
    }
}

/// Metric computation options
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// `"recovery_distance"` or `"recovery_index"`
    pub tbp_mode: String,
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tbp_mode: "recovery_distance".to_string(),
            parallel: true,
        }
    }
}

/// Process-level settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub max_threads: usize, // 0 = rayon default
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            log_level: "info".to_string(),
        }
    }
}

/// Rendered summary options
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Decimal places for every metric; per-metric defaults when unset
    pub precision: Option<usize>,
}
