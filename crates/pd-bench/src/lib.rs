//! Scenario runner and run summaries for popdyn models.
//!
//! Runs a scenario N times, times each run, reduces each trajectory to a
//! final value and a maximum, and persists the aggregate as JSON.

/// Crate version, reported by environment checks.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod runner;
pub mod scenario;
pub mod store;

pub use runner::{IterationResult, ScenarioSummary, run_scenario};
pub use scenario::{
    ModelKind, ReportSpec, Scenario, default_scenarios, find_scenario, load_scenarios,
    save_scenarios,
};
pub use store::{BenchSuite, load_summary, summary_file_name, write_suite, write_summary};

use std::path::PathBuf;

pub type BenchResult<T> = Result<T, BenchError>;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("Simulation error: {0}")]
    Sim(#[from] pd_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Unknown quantity '{name}' for model {model}")]
    UnknownQuantity { name: String, model: &'static str },

    #[error("Unsupported scenario file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}
