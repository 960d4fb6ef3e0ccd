// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, SgapConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SGAP_CONFIG_PATH";

/// Find the configuration file
///
/// Search order:
/// 1. `SGAP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./sgap_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Value checks are left to [`validate_config`](crate::validate_config).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SgapConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: SgapConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SGAP_N_EXPERIMENTS` -> `experiment.n_experiments`
/// - `SGAP_ITERS` -> `experiment.iters`
/// - `SGAP_N_TASKS` -> `experiment.n_tasks`
/// - `SGAP_TBP_MODE` -> `analysis.tbp_mode`
/// - `SGAP_PARALLEL` -> `analysis.parallel`
/// - `SGAP_MAX_THREADS` -> `runtime.max_threads`
/// - `SGAP_LOG_LEVEL` -> `runtime.log_level`
///
/// Unparseable numbers are ignored.
pub fn apply_environment_overrides(config: &mut SgapConfig) {
    if let Ok(value) = env::var("SGAP_N_EXPERIMENTS") {
        if let Ok(n) = value.parse::<usize>() {
            config.experiment.n_experiments = n;
        }
    }
    if let Ok(value) = env::var("SGAP_ITERS") {
        if let Ok(iters) = value.parse::<usize>() {
            config.experiment.iters = iters;
        }
    }
    if let Ok(value) = env::var("SGAP_N_TASKS") {
        if let Ok(n) = value.parse::<usize>() {
            config.experiment.n_tasks = n;
        }
    }

    if let Ok(value) = env::var("SGAP_TBP_MODE") {
        config.analysis.tbp_mode = value;
    }
    if let Ok(value) = env::var("SGAP_PARALLEL") {
        config.analysis.parallel = parse_bool(&value);
    }

    if let Ok(value) = env::var("SGAP_MAX_THREADS") {
        if let Ok(threads) = value.parse::<usize>() {
            config.runtime.max_threads = threads;
        }
    }
    if let Ok(value) = env::var("SGAP_LOG_LEVEL") {
        config.runtime.log_level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"iters": "300", "n_tasks": "5"}`)
pub fn apply_cli_overrides(config: &mut SgapConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("n_experiments") {
        if let Ok(n) = value.parse::<usize>() {
            config.experiment.n_experiments = n;
        }
    }
    if let Some(value) = cli_args.get("iters") {
        if let Ok(iters) = value.parse::<usize>() {
            config.experiment.iters = iters;
        }
    }
    if let Some(value) = cli_args.get("n_tasks") {
        if let Ok(n) = value.parse::<usize>() {
            config.experiment.n_tasks = n;
        }
    }

    if let Some(value) = cli_args.get("tbp_mode") {
        config.analysis.tbp_mode = value.clone();
    }
    if let Some(value) = cli_args.get("parallel") {
        config.analysis.parallel = parse_bool(value);
    }

    if let Some(value) = cli_args.get("max_threads") {
        if let Ok(threads) = value.parse::<usize>() {
            config.runtime.max_threads = threads;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.runtime.log_level = value.clone();
    }

    if let Some(value) = cli_args.get("precision") {
        if let Ok(precision) = value.parse::<usize>() {
            config.report.precision = Some(precision);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: [&str; 7] = [
        "SGAP_N_EXPERIMENTS",
        "SGAP_ITERS",
        "SGAP_N_TASKS",
        "SGAP_TBP_MODE",
        "SGAP_PARALLEL",
        "SGAP_MAX_THREADS",
        "SGAP_LOG_LEVEL",
    ];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var(CONFIG_PATH_ENV, config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        env::set_var(CONFIG_PATH_ENV, missing.to_str().unwrap());
        let result = find_config_file();
        env::remove_var(CONFIG_PATH_ENV);

        assert!(matches!(result, Err(ConfigError::FileNotFound(msg)) if msg.contains("nope.toml")));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[experiment]").unwrap();
        writeln!(file, "iters = 300").unwrap();
        writeln!(file, "[report]").unwrap();
        writeln!(file, "precision = 4").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.experiment.iters, 300);
        assert_eq!(config.experiment.n_tasks, 4);
        assert_eq!(config.experiment.n_experiments, 10);
        assert_eq!(config.report.precision, Some(4));
        assert!(config.analysis.parallel);
    }

    #[test]
    fn test_load_empty_file_gives_defaults() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        File::create(&config_path).unwrap();

        let config = load_config(Some(&config_path), None).unwrap();
        assert_eq!(config, SgapConfig::default());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[experiment\niters = ").unwrap();

        assert!(matches!(
            load_config(Some(&config_path), None),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = SgapConfig::default();

        env::set_var("SGAP_ITERS", "250");
        env::set_var("SGAP_TBP_MODE", "recovery_index");
        env::set_var("SGAP_PARALLEL", "no");
        env::set_var("SGAP_MAX_THREADS", "not-a-number");

        apply_environment_overrides(&mut config);
        clear_override_vars();

        assert_eq!(config.experiment.iters, 250);
        assert_eq!(config.analysis.tbp_mode, "recovery_index");
        assert!(!config.analysis.parallel);
        assert_eq!(config.runtime.max_threads, 0);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = SgapConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("n_tasks".to_string(), "5".to_string());
        cli_args.insert("precision".to_string(), "1".to_string());
        cli_args.insert("log_level".to_string(), "debug".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.experiment.n_tasks, 5);
        assert_eq!(config.report.precision, Some(1));
        assert_eq!(config.runtime.log_level, "debug");
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[experiment]").unwrap();
        writeln!(file, "iters = 100").unwrap();
        writeln!(file, "n_experiments = 3").unwrap();

        env::set_var("SGAP_ITERS", "200");
        env::set_var("SGAP_N_EXPERIMENTS", "7");

        let mut cli_args = HashMap::new();
        cli_args.insert("iters".to_string(), "400".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();
        clear_override_vars();

        // CLI wins for iters, env wins for n_experiments (no CLI override)
        assert_eq!(config.experiment.iters, 400);
        assert_eq!(config.experiment.n_experiments, 7);
    }
}
