//! Repeated scenario execution with wall-clock timing.

use serde::{Deserialize, Serialize};
use tracing::info;

use pd_core::{Timer, TimingSamples};
use pd_sim::{CompartmentModel, LogisticGrowth, Overrides, RunRequest, Sir, run_sim};

use crate::scenario::{ModelKind, ReportSpec, Scenario};
use crate::{BenchError, BenchResult};

/// Log progress every this many iterations.
const PROGRESS_EVERY: usize = 5;

/// One timed run of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IterationResult {
    pub iteration: usize,
    pub final_value: f64,
    pub max_value: f64,
    pub execution_ms: f64,
    pub data_points: usize,
}

/// Aggregate of repeated runs of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSummary {
    pub scenario_id: String,
    pub scenario: String,
    pub model: ModelKind,
    pub worker_id: String,
    pub parameters: Overrides,
    pub initial: Overrides,
    pub report: ReportSpec,
    pub iterations: usize,
    pub total_time_seconds: f64,
    pub avg_time_ms: f64,
    pub median_time_ms: f64,
    pub min_time_ms: f64,
    pub max_time_ms: f64,
    pub avg_final_value: f64,
    pub timestamp: String,
    pub results: Vec<IterationResult>,
}

struct RunOutcome {
    final_value: f64,
    max_value: f64,
    elapsed_s: f64,
    data_points: usize,
}

fn measure<M: CompartmentModel>(
    model: &M,
    request: &RunRequest,
    report: &ReportSpec,
) -> BenchResult<RunOutcome> {
    let timer = Timer::start(M::NAME);
    let trajectory = run_sim(model, request)?;
    let elapsed_s = timer.stop();

    let final_value = trajectory
        .final_value(&report.final_of)
        .ok_or_else(|| BenchError::UnknownQuantity {
            name: report.final_of.clone(),
            model: M::NAME,
        })?;
    let max_value = trajectory
        .max_of(&report.max_of)
        .map(|peak| peak.value)
        .ok_or_else(|| BenchError::UnknownQuantity {
            name: report.max_of.clone(),
            model: M::NAME,
        })?;

    Ok(RunOutcome {
        final_value,
        max_value,
        elapsed_s,
        data_points: trajectory.len(),
    })
}

fn ms(seconds: Option<f64>) -> f64 {
    seconds.unwrap_or(0.0) * 1000.0
}

fn run_once(
    scenario: &Scenario,
    request: &RunRequest,
    report: &ReportSpec,
) -> BenchResult<RunOutcome> {
    match scenario.model {
        ModelKind::Logistic => measure(&LogisticGrowth::default(), request, report),
        ModelKind::Sir => measure(&Sir::default(), request, report),
    }
}

/// Run a single scenario `iterations` times.
pub fn run_scenario(
    scenario: &Scenario,
    iterations: usize,
    worker_id: &str,
) -> BenchResult<ScenarioSummary> {
    if iterations == 0 {
        return Err(BenchError::InvalidScenario(
            "iterations must be positive".to_string(),
        ));
    }

    let request = scenario.request();
    let report = scenario.report();

    info!(
        scenario = %scenario.name,
        model = scenario.model.name(),
        parameters = ?scenario.parameters,
        initial = ?scenario.initial,
        iterations,
        "running scenario"
    );

    let wall = Timer::start("scenario");
    let mut run_times = TimingSamples::with_capacity(iterations);
    let mut results = Vec::with_capacity(iterations);

    for i in 0..iterations {
        let outcome = run_once(scenario, &request, &report)?;
        run_times.record(outcome.elapsed_s);

        results.push(IterationResult {
            iteration: i + 1,
            final_value: outcome.final_value,
            max_value: outcome.max_value,
            execution_ms: outcome.elapsed_s * 1000.0,
            data_points: outcome.data_points,
        });

        if (i + 1) % PROGRESS_EVERY == 0 {
            info!(completed = i + 1, iterations, "progress");
        }
    }

    let total_time_seconds = wall.stop_and_log();

    let avg_final_value = results.iter().map(|r| r.final_value).sum::<f64>() / iterations as f64;

    let summary = ScenarioSummary {
        scenario_id: scenario.id.clone(),
        scenario: scenario.name.clone(),
        model: scenario.model,
        worker_id: worker_id.to_string(),
        parameters: scenario.parameters.clone(),
        initial: scenario.initial.clone(),
        report,
        iterations,
        total_time_seconds,
        avg_time_ms: run_times.mean_seconds() * 1000.0,
        median_time_ms: ms(run_times.median_seconds()),
        min_time_ms: ms(run_times.min_seconds()),
        max_time_ms: ms(run_times.max_seconds()),
        avg_final_value,
        timestamp: chrono::Utc::now().to_rfc3339(),
        results,
    };

    info!(
        iterations,
        total_time_s = summary.total_time_seconds,
        avg_time_ms = summary.avg_time_ms,
        avg_final_value = summary.avg_final_value,
        "scenario complete"
    );

    Ok(summary)
}
