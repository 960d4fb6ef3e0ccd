// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Stability-gap report for recorded trials.
//!
//! Reads one or more trial files (`{"rows": [...]}` or an array of them),
//! runs the metrics engine and prints the summary. Exit code 2 on usage,
//! configuration or I/O errors; 1 when no trial could be analysed.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use stability_gap::config::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    validate_config, ConfigError, SgapConfig,
};
use stability_gap::input::read_trial_files;
use stability_gap::metrics::{MetricsEngine, MetricsError, ReportFormatter};
use stability_gap::observability::{
    debug_flags_help, init_logging, parse_debug_flags, CrateDebugFlags, LoggingConfig,
};
use stability_gap::runtime::{configure_thread_pool, engine_config_from};

struct Args {
    config_path: Option<PathBuf>,
    overrides: HashMap<String, String>,
    json: bool,
    debug_flags: CrateDebugFlags,
    files: Vec<PathBuf>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: stability_report [options] <trial.json>...\n\n\
         Options:\n\
         - --config <path>        configuration file (default: search for sgap_configuration.toml)\n\
         - --iters <n>            iterations per task\n\
         - --n-tasks <n>          number of tasks\n\
         - --tbp-mode <mode>      recovery_distance | recovery_index\n\
         - --precision <n>        decimal places for every metric\n\
         - --threads <n>          rayon worker threads (0 = default)\n\
         - --sequential           analyse trials on the calling thread\n\
         - --json                 print the report as JSON\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut config_path = None;
    let mut overrides = HashMap::new();
    let mut json = false;
    let mut debug_args = Vec::new();
    let mut files = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        let key = match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config_path = Some(PathBuf::from(v));
                continue;
            }
            "--json" => {
                json = true;
                continue;
            }
            "--sequential" => {
                overrides.insert("parallel".to_string(), "false".to_string());
                continue;
            }
            "-h" | "--help" => usage_and_exit(),
            "--iters" => "iters",
            "--n-tasks" => "n_tasks",
            "--tbp-mode" => "tbp_mode",
            "--precision" => "precision",
            "--threads" => "max_threads",
            other if other.starts_with("--debug-") => {
                debug_args.push(other.to_string());
                continue;
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
            other => {
                files.push(PathBuf::from(other));
                continue;
            }
        };
        let v = args.next().unwrap_or_else(|| usage_and_exit());
        overrides.insert(key.to_string(), v);
    }

    if files.is_empty() {
        eprintln!("No trial files given");
        usage_and_exit();
    }

    let debug_flags = parse_debug_flags(debug_args);

    Args {
        config_path,
        overrides,
        json,
        debug_flags,
        files,
    }
}

/// Explicit path, else the searched file, else built-in defaults
fn resolve_config(args: &Args) -> Result<SgapConfig, ConfigError> {
    let path = match &args.config_path {
        Some(path) => Some(path.clone()),
        None => match find_config_file() {
            Ok(path) => Some(path),
            Err(ConfigError::FileNotFound(_)) => None,
            Err(err) => return Err(err),
        },
    };

    match path {
        Some(path) => load_config(Some(&path), Some(&args.overrides)),
        None => {
            let mut config = SgapConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &args.overrides);
            Ok(config)
        }
    }
}

fn main() {
    let args = parse_args();

    let config = resolve_config(&args).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(2);
    });
    if let Err(e) = validate_config(&config) {
        eprintln!("{e}");
        process::exit(2);
    }

    let logging = LoggingConfig::with_level(&config.runtime.log_level);
    if let Err(e) = init_logging(&args.debug_flags, &logging) {
        eprintln!("Failed to initialize logging: {e:#}");
        process::exit(2);
    }
    configure_thread_pool(config.runtime.max_threads);

    let engine = engine_config_from(&config)
        .and_then(|engine_config| MetricsEngine::new(engine_config).map_err(Into::into))
        .unwrap_or_else(|e| {
            eprintln!("{e:#}");
            process::exit(2);
        });

    let trials = read_trial_files(&args.files).unwrap_or_else(|e| {
        eprintln!("{e:#}");
        process::exit(2);
    });
    if trials.len() != config.experiment.n_experiments {
        tracing::warn!(
            read = trials.len(),
            configured = config.experiment.n_experiments,
            "trial count differs from experiment.n_experiments"
        );
    }

    let output = match engine.run_rows(trials) {
        Ok(output) => output,
        Err(e @ MetricsError::NoValidTrials { .. }) => {
            eprintln!("{e}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&output.report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                process::exit(2);
            }
        }
    } else {
        println!(
            "{}",
            ReportFormatter::new(config.report.precision).render(&output.report)
        );
    }
}
