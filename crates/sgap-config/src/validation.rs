// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks the run shape and the named options before any trial is analysed.
//! Every violation is collected so a bad file is reported in one pass.

use crate::{ConfigError, ConfigResult, SgapConfig};

/// Smallest iteration budget that holds a 5-sample baseline plus a window
pub const MIN_ITERS: usize = 6;

/// Accepted `analysis.tbp_mode` values (case-insensitive)
pub const TBP_MODES: [&str; 2] = ["recovery_distance", "recovery_index"];

/// Accepted `runtime.log_level` values (case-insensitive)
pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange {
        field: String,
        value: usize,
        minimum: usize,
    },
    UnknownOption {
        field: String,
        value: String,
        allowed: String,
    },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                value,
                minimum,
            } => write!(f, "{} = {} is below the minimum of {}", field, value, minimum),
            Self::UnknownOption {
                field,
                value,
                allowed,
            } => write!(f, "{} = \"{}\" is not one of: {}", field, value, allowed),
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - `experiment.n_experiments >= 1`
/// - `experiment.iters >= 6`
/// - `experiment.n_tasks >= 2`
/// - a known `analysis.tbp_mode` and `runtime.log_level`
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &SgapConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_run_shape(config, &mut errors);
    validate_options(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn check_minimum(
    field: &str,
    value: usize,
    minimum: usize,
    errors: &mut Vec<ConfigValidationError>,
) {
    if value < minimum {
        errors.push(ConfigValidationError::OutOfRange {
            field: field.to_string(),
            value,
            minimum,
        });
    }
}

fn validate_run_shape(config: &SgapConfig, errors: &mut Vec<ConfigValidationError>) {
    let experiment = &config.experiment;
    check_minimum("experiment.n_experiments", experiment.n_experiments, 1, errors);
    check_minimum("experiment.iters", experiment.iters, MIN_ITERS, errors);
    check_minimum("experiment.n_tasks", experiment.n_tasks, 2, errors);
}

/// Named options are matched trimmed and lowercased, as the engine parses them
fn normalize_option(value: &str) -> String {
    value.trim().to_lowercase()
}

fn validate_options(config: &SgapConfig, errors: &mut Vec<ConfigValidationError>) {
    let tbp_mode = normalize_option(&config.analysis.tbp_mode);
    if !TBP_MODES.contains(&tbp_mode.as_str()) {
        errors.push(ConfigValidationError::UnknownOption {
            field: "analysis.tbp_mode".to_string(),
            value: config.analysis.tbp_mode.clone(),
            allowed: TBP_MODES.join(", "),
        });
    }

    let level = normalize_option(&config.runtime.log_level);
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::UnknownOption {
            field: "runtime.log_level".to_string(),
            value: config.runtime.log_level.clone(),
            allowed: LOG_LEVELS.join(", "),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SgapConfig::default();
        let result = validate_config(&config);
        if let Err(e) = &result {
            eprintln!("Validation error: {}", e);
        }
        assert!(result.is_ok());
    }

    #[test]
    fn test_single_task_rejected() {
        let mut config = SgapConfig::default();
        config.experiment.n_tasks = 1;

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("experiment.n_tasks"));
                assert!(msg.contains("minimum of 2"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_all_violations_reported() {
        let mut config = SgapConfig::default();
        config.experiment.n_experiments = 0;
        config.experiment.iters = 5;
        config.analysis.tbp_mode = "scan".to_string();
        config.runtime.log_level = "loud".to_string();

        let Err(ConfigError::ValidationError(msg)) = validate_config(&config) else {
            panic!("expected validation error");
        };
        assert_eq!(msg.lines().count(), 5);
        assert!(msg.contains("experiment.n_experiments = 0"));
        assert!(msg.contains("experiment.iters = 5"));
        assert!(msg.contains("\"scan\""));
        assert!(msg.contains("\"loud\""));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = SgapConfig::default();
        config.runtime.log_level = "WARNING".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_tbp_mode_case_insensitive() {
        let mut config = SgapConfig::default();
        config.analysis.tbp_mode = "Recovery_Index".to_string();
        assert!(validate_config(&config).is_ok());

        config.analysis.tbp_mode = " RECOVERY_DISTANCE ".to_string();
        assert!(validate_config(&config).is_ok());

        config.analysis.tbp_mode = "recovery-index".to_string();
        assert!(validate_config(&config).is_err());
    }
}
