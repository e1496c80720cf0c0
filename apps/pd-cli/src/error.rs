//! Error type for the command-line front end.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Simulation error: {0}")]
    Sim(#[from] pd_sim::SimError),

    #[error("{0}")]
    Bench(#[from] pd_bench::BenchError),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported output format: {}", .0.display())]
    UnsupportedOutput(PathBuf),

    #[error("Environment check failed: {0} check(s) did not pass")]
    VerifyFailed(usize),
}

pub type CliResult<T> = Result<T, CliError>;
