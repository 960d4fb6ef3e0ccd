// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Installs a global `tracing` subscriber writing to stderr, so stdout stays
//! free for reports.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;
use crate::config::{normalize_level, LogFormat, LoggingConfig};

/// Build the filter: `RUST_LOG` when set, otherwise the debug flags over the base level
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::try_from_default_env()
            .with_context(|| format!("Invalid {} filter", EnvFilter::DEFAULT_ENV));
    }

    let filter = debug_flags.to_filter_string(&normalize_level(&config.level));
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Initialize logging
///
/// Returns `Ok(false)` when a global subscriber was already installed; the
/// existing one is kept.
///
/// # Arguments
/// * `debug_flags` - Per-crate debug flags
/// * `config` - Base level and output format
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(debug_flags, config)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_file(false)
        .with_line_number(false);

    let installed = match config.format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };

    if installed {
        tracing::debug!(
            level = %config.level,
            debug_crates = ?debug_flags.enabled_crates,
            "logging initialized"
        );
    }
    Ok(installed)
}

/// Initialize logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<bool> {
    init_logging(debug_flags, &LoggingConfig::default())
}
