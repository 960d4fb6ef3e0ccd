// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};
use crate::performance_log::MIN_ITERS;

/// How time-before-performance-recovers is measured per window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TbpMode {
    /// Iterations from trough to the recovery index
    #[default]
    RecoveryDistance,
    /// Window-relative position of the recovery scan cursor
    RecoveryIndex,
}

impl TbpMode {
    /// Parse the configuration spelling
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "recovery_distance" => Some(TbpMode::RecoveryDistance),
            "recovery_index" => Some(TbpMode::RecoveryIndex),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TbpMode::RecoveryDistance => "recovery_distance",
            TbpMode::RecoveryIndex => "recovery_index",
        }
    }
}

/// Parameters shared by every trial of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Iterations per task window
    pub iters: usize,

    /// Number of tasks in the sequence
    pub n_tasks: usize,

    /// TBP measurement
    pub tbp_mode: TbpMode,

    /// Analyse trials and tasks on the rayon pool
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iters: 500,
            n_tasks: 4,
            tbp_mode: TbpMode::default(),
            parallel: true,
        }
    }
}

impl EngineConfig {
    pub fn new(iters: usize, n_tasks: usize) -> Self {
        Self {
            iters,
            n_tasks,
            ..Default::default()
        }
    }

    /// Check the shape preconditions before any trial is touched
    pub fn validate(&self) -> Result<()> {
        if self.n_tasks < 2 {
            return Err(MetricsError::InvalidTaskCount {
                n_tasks: self.n_tasks,
            });
        }
        if self.iters < MIN_ITERS {
            return Err(MetricsError::InvalidIterations {
                iters: self.iters,
                minimum: MIN_ITERS,
            });
        }
        Ok(())
    }
}
