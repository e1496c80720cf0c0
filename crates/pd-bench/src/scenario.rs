//! Scenario definitions and scenario files.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use pd_sim::{GridSpec, Overrides, RunRequest};

use crate::{BenchError, BenchResult};

/// Which model a scenario runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Logistic,
    Sir,
}

impl ModelKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Logistic => "logistic",
            ModelKind::Sir => "sir",
        }
    }

    /// Quantities summarized when a scenario does not say otherwise.
    pub fn default_report(&self) -> ReportSpec {
        match self {
            ModelKind::Logistic => ReportSpec {
                final_of: "population".to_string(),
                max_of: "growth_rate".to_string(),
            },
            ModelKind::Sir => ReportSpec {
                final_of: "infected".to_string(),
                max_of: "infected".to_string(),
            },
        }
    }

    pub fn default_grid(&self) -> GridSpec {
        match self {
            ModelKind::Logistic => GridSpec::uniform(0.0, 1000.0, 1.0),
            ModelKind::Sir => GridSpec::uniform(0.0, 60.0, 0.125),
        }
    }
}

/// Which trajectory quantities a summary reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSpec {
    /// Quantity whose final value is reported.
    pub final_of: String,
    /// Quantity whose maximum over the run is reported.
    pub max_of: String,
}

/// A named, repeatable run definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Unique identifier, used on the command line and in file names.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub model: ModelKind,
    /// Parameter overrides merged onto the model defaults.
    #[serde(default)]
    pub parameters: Overrides,
    /// Initial compartment overrides.
    #[serde(default)]
    pub initial: Overrides,
    pub grid: GridSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportSpec>,
}

impl Scenario {
    pub fn new(id: &str, name: &str, model: ModelKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            model,
            parameters: Overrides::new(),
            initial: Overrides::new(),
            grid: model.default_grid(),
            report: None,
        }
    }

    pub fn with_parameter(mut self, name: &str, value: f64) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    pub fn with_initial(mut self, name: &str, value: f64) -> Self {
        self.initial.insert(name.to_string(), value);
        self
    }

    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    pub fn request(&self) -> RunRequest {
        RunRequest {
            parameters: self.parameters.clone(),
            initial: self.initial.clone(),
            grid: self.grid.clone(),
        }
    }

    pub fn report(&self) -> ReportSpec {
        self.report
            .clone()
            .unwrap_or_else(|| self.model.default_report())
    }
}

/// Built-in scenarios.
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("baseline", "Baseline Scenario", ModelKind::Logistic),
        Scenario::new("high_growth", "High Growth Scenario", ModelKind::Logistic)
            .with_parameter("growth_rate", 0.05),
        Scenario::new("low_capacity", "Low Capacity Scenario", ModelKind::Logistic)
            .with_parameter("carrying_capacity", 5000.0),
        Scenario::new("stressed", "Stressed Scenario", ModelKind::Logistic)
            .with_initial("population", 9000.0)
            .with_parameter("growth_rate", 0.01),
        Scenario::new("extreme", "Extreme Growth", ModelKind::Logistic)
            .with_parameter("growth_rate", 0.1)
            .with_parameter("carrying_capacity", 50_000.0),
        Scenario::new("sir_baseline", "SIR Baseline", ModelKind::Sir),
        Scenario::new("sir_short", "SIR 30 Day Horizon", ModelKind::Sir)
            .with_grid(GridSpec::uniform(0.0, 30.0, 0.125)),
    ]
}

/// Look up a scenario by id.
pub fn find_scenario<'a>(scenarios: &'a [Scenario], id: &str) -> BenchResult<&'a Scenario> {
    scenarios
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| BenchError::UnknownScenario(id.to_string()))
}

fn validate_scenarios(scenarios: &[Scenario]) -> BenchResult<()> {
    let mut seen = HashSet::new();
    for scenario in scenarios {
        if scenario.id.trim().is_empty() {
            return Err(BenchError::InvalidScenario(
                "scenario id must not be empty".to_string(),
            ));
        }
        if !seen.insert(scenario.id.as_str()) {
            return Err(BenchError::InvalidScenario(format!(
                "duplicate scenario id '{}'",
                scenario.id
            )));
        }
    }
    Ok(())
}

enum FileFormat {
    Json,
    Yaml,
}

fn file_format(path: &Path) -> BenchResult<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(FileFormat::Json),
        Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
        _ => Err(BenchError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Load scenarios from a YAML or JSON file (chosen by extension).
pub fn load_scenarios(path: &Path) -> BenchResult<Vec<Scenario>> {
    let format = file_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let scenarios: Vec<Scenario> = match format {
        FileFormat::Json => serde_json::from_str(&content)?,
        FileFormat::Yaml => serde_yaml::from_str(&content)?,
    };
    validate_scenarios(&scenarios)?;
    Ok(scenarios)
}

/// Save scenarios as YAML or JSON (chosen by extension).
pub fn save_scenarios(path: &Path, scenarios: &[Scenario]) -> BenchResult<()> {
    validate_scenarios(scenarios)?;
    let content = match file_format(path)? {
        FileFormat::Json => serde_json::to_string_pretty(scenarios)?,
        FileFormat::Yaml => serde_yaml::to_string(scenarios)?,
    };
    std::fs::write(path, content)?;
    Ok(())
}
