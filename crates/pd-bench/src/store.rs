//! Summary persistence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::BenchResult;
use crate::runner::ScenarioSummary;

/// Collection of summaries from one sweep over several scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchSuite {
    pub timestamp: String,
    pub summaries: Vec<ScenarioSummary>,
}

/// File name a summary is stored under: `results_{worker}_{scenario}.json`.
pub fn summary_file_name(worker_id: &str, scenario_id: &str) -> String {
    format!("results_{worker_id}_{scenario_id}.json")
}

/// Write `summary` as pretty JSON into `dir`, returning the file path.
pub fn write_summary(dir: &Path, summary: &ScenarioSummary) -> BenchResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(summary_file_name(&summary.worker_id, &summary.scenario_id));
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn load_summary(path: &Path) -> BenchResult<ScenarioSummary> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a whole suite as pretty JSON to `path`, creating parent directories.
pub fn write_suite(path: &Path, suite: &BenchSuite) -> BenchResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(suite)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_layout() {
        assert_eq!(
            summary_file_name("c1", "baseline"),
            "results_c1_baseline.json"
        );
    }
}
