// Copyright 2025 Stability Gap Contributors
// SPDX-License-Identifier: Apache-2.0

//! Trial input files
//!
//! A file holds either one trial, `{"rows": [[...], ...]}`, or a JSON array
//! of such objects. Rows are returned raw; shape checks happen in the engine
//! so a malformed trial is excluded rather than aborting the run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw rows of one trial, one row per task
pub type TrialRows = Vec<Vec<f64>>;

#[derive(Debug, Deserialize)]
struct TrialRecord {
    rows: TrialRows,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TrialFile {
    One(TrialRecord),
    Many(Vec<TrialRecord>),
}

/// Parse one file's contents into its trials
pub fn parse_trials(json: &str) -> Result<Vec<TrialRows>> {
    let file: TrialFile = serde_json::from_str(json)
        .context("expected {\"rows\": [...]} or an array of such objects")?;
    Ok(match file {
        TrialFile::One(record) => vec![record.rows],
        TrialFile::Many(records) => records.into_iter().map(|r| r.rows).collect(),
    })
}

/// Read every file in order; trial numbers follow file order
pub fn read_trial_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<TrialRows>> {
    let mut trials = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read trial file {}", path.display()))?;
        let parsed = parse_trials(&raw)
            .with_context(|| format!("Failed to parse trial file {}", path.display()))?;
        tracing::debug!(file = %path.display(), trials = parsed.len(), "read trial file");
        trials.extend(parsed);
    }
    Ok(trials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_trial_object() {
        let trials = parse_trials(r#"{"rows": [[1, 2], [3]]}"#).unwrap();
        assert_eq!(trials, vec![vec![vec![1.0, 2.0], vec![3.0]]]);
    }

    #[test]
    fn test_trial_array() {
        let trials = parse_trials(r#"[{"rows": [[1]]}, {"rows": [[2], [3]]}]"#).unwrap();
        assert_eq!(trials.len(), 2);
        assert_eq!(trials[1].len(), 2);
    }

    #[test]
    fn test_wrong_shape_rejected() {
        assert!(parse_trials(r#"{"samples": []}"#).is_err());
        assert!(parse_trials("[[1, 2]]").is_err());
    }
}
