// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! # stability-gap
//!
//! Metrics for the stability gap of continual learning: the transient drop
//! in accuracy on earlier tasks right after a task switch, and its recovery.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stability_gap::prelude::*;
//!
//! let engine = MetricsEngine::new(EngineConfig::new(500, 4))?;
//! let logs: Vec<PerformanceLog> = Vec::new(); // one per trial
//! let output = engine.run(&logs)?;
//! println!("{}", output.report);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`config`** (default): `sgap_configuration.toml` loading and
//!   conversion into an [`EngineConfig`](metrics::EngineConfig)
//! - **`observability`** (default): `tracing` subscriber setup
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Infrastructure: sgap-config,                │
//! │  sgap-observability                          │
//! └──────────────────────────────────────────────┘
//!                       ↓
//! ┌──────────────────────────────────────────────┐
//! │  Algorithms: sgap-metrics                    │
//! │  (pure computation, no I/O)                  │
//! └──────────────────────────────────────────────┘
//!                       ↓
//! ┌──────────────────────────────────────────────┐
//! │  Tools: stability_report                     │
//! └──────────────────────────────────────────────┘
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export algorithms
pub use sgap_metrics as metrics;

// Re-export infrastructure
#[cfg(feature = "config")]
pub use sgap_config as config;

#[cfg(feature = "observability")]
pub use sgap_observability as observability;

pub mod input;

#[cfg(feature = "config")]
pub mod runtime;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::metrics::{
        AggregateReport, EngineConfig, EngineOutput, Metric, MetricSummary, MetricsEngine,
        MetricsError, PerformanceLog, PerformanceRecorder, ReportFormatter, TbpMode,
        TrialMetrics,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, SgapConfig};

    #[cfg(feature = "config")]
    pub use crate::runtime::{configure_thread_pool, engine_config_from};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, CrateDebugFlags, LoggingConfig};
}
