// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

/*!
Configuration-to-report pipeline tests.

These tests validate:
- A TOML file and CLI overrides produce the engine's run parameters
- Trial files in both layouts are read in order
- Malformed trials are excluded and reported, not fatal
*/

use std::collections::HashMap;
use std::fs;

use stability_gap::config::{load_config, validate_config};
use stability_gap::input::read_trial_files;
use stability_gap::prelude::*;
use tempfile::tempdir;

const ITERS: usize = 10;
const N_TASKS: usize = 3;

fn trial_json(offset: f64) -> String {
    let rows: Vec<Vec<f64>> = (0..N_TASKS)
        .map(|t| {
            (0..ITERS * (N_TASKS - t))
                .map(|i| offset + 80.0 - ((i * 7 + t) % 6) as f64)
                .collect()
        })
        .collect();
    serde_json::json!({ "rows": rows }).to_string()
}

#[test]
fn test_config_file_to_engine() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("sgap_configuration.toml");
    fs::write(
        &config_path,
        "[experiment]\nn_experiments = 3\niters = 10\nn_tasks = 3\n\n[analysis]\ntbp_mode = \"recovery_index\"\n",
    )
    .unwrap();

    let mut cli = HashMap::new();
    cli.insert("parallel".to_string(), "false".to_string());
    let config = load_config(Some(&config_path), Some(&cli)).unwrap();
    validate_config(&config).unwrap();

    let engine_config = engine_config_from(&config).unwrap();
    assert_eq!(engine_config.iters, ITERS);
    assert_eq!(engine_config.n_tasks, N_TASKS);
    assert_eq!(engine_config.tbp_mode, TbpMode::RecoveryIndex);
    assert!(!engine_config.parallel);
    assert!(MetricsEngine::new(engine_config).is_ok());
}

#[test]
fn test_trial_files_to_report() {
    let dir = tempdir().unwrap();
    let single = dir.path().join("trial_0.json");
    let many = dir.path().join("trials_1_2.json");
    fs::write(&single, trial_json(0.0)).unwrap();
    fs::write(
        &many,
        format!(
            "[{}, {{\"rows\": [[1.0, 2.0]]}}]",
            trial_json(2.0)
        ),
    )
    .unwrap();

    let trials = read_trial_files(&[single, many]).unwrap();
    assert_eq!(trials.len(), 3);

    let engine = MetricsEngine::new(EngineConfig::new(ITERS, N_TASKS)).unwrap();
    let output = engine.run_rows(trials).unwrap();
    let report = &output.report;

    assert_eq!(report.trials_attempted, 3);
    assert_eq!(report.trials_used, 2);
    assert_eq!(report.excluded[0].trial, 2);

    // Trial 1 is trial 0 shifted up by 2
    let acc = report.get(Metric::Accuracy);
    assert!((acc.mean - (output.trials[0].scalars.acc + 1.0)).abs() < 1e-9);
    assert!((acc.standard_error - 1.0).abs() < 1e-9);

    let text = ReportFormatter::new(Some(1)).render(report);
    assert!(text.starts_with("Runs: 2 (of 3 attempted)"));
    assert!(text.contains("Excluded trial 2:"));

    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["trials_used"], 2);
    assert!(json["metrics"]["ACC"]["mean"].is_number());
}

#[test]
fn test_missing_trial_file() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    let err = read_trial_files(&[missing]).unwrap_err();
    assert!(format!("{err:#}").contains("absent.json"));
}
