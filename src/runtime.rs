// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bridges a loaded [`SgapConfig`] to the metrics engine

use anyhow::{anyhow, Result};
use tracing::{info, warn};

use crate::config::SgapConfig;
use crate::metrics::{EngineConfig, TbpMode};

/// Convert the file/env/CLI configuration into the engine's run parameters
///
/// # Errors
///
/// Fails on an unknown `analysis.tbp_mode`. Shape checks are left to
/// [`MetricsEngine::new`](crate::metrics::MetricsEngine::new).
pub fn engine_config_from(config: &SgapConfig) -> Result<EngineConfig> {
    let tbp_mode = TbpMode::from_name(&config.analysis.tbp_mode)
        .ok_or_else(|| anyhow!("Unknown tbp_mode: {}", config.analysis.tbp_mode))?;

    Ok(EngineConfig {
        iters: config.experiment.iters,
        n_tasks: config.experiment.n_tasks,
        tbp_mode,
        parallel: config.analysis.parallel,
    })
}

/// Size the global rayon pool
///
/// `0` keeps rayon's default. Returns whether the pool was configured; a pool
/// that is already running is left as it is.
pub fn configure_thread_pool(max_threads: usize) -> bool {
    if max_threads == 0 {
        return false;
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(max_threads)
        .build_global()
    {
        Ok(()) => {
            info!(threads = max_threads, "configured rayon thread pool");
            true
        }
        Err(err) => {
            warn!(error = %err, "rayon thread pool already configured");
            false
        }
    }
}
