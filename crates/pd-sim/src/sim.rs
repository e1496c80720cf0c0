//! Simulation runner.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{SimError, SimResult};
use crate::grid::{DEFAULT_MAX_POINTS, GridSpec};
use crate::integrator::{ForwardEuler, Integrator};
use crate::model::{CompartmentModel, Compartments};
use crate::params::{NamedValues, Overrides, ParameterSet};
use crate::trajectory::{Record, Trajectory};

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Maximum number of grid points (safety limit)
    pub max_points: usize,
    /// Emit a progress event every N steps (0 disables intermediate events)
    pub progress_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            progress_every: 1000,
        }
    }
}

/// Inputs for one run: overrides merged onto model defaults, plus a grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub parameters: Overrides,
    #[serde(default)]
    pub initial: Overrides,
    pub grid: GridSpec,
}

impl RunRequest {
    pub fn new(grid: GridSpec) -> Self {
        Self {
            parameters: Overrides::new(),
            initial: Overrides::new(),
            grid,
        }
    }

    /// Request with no overrides over the model's default grid.
    pub fn for_model<M: CompartmentModel>(model: &M) -> Self {
        Self::new(model.default_grid())
    }

    /// Request over `start, start + step, ...` through `final_time`.
    pub fn uniform(start_time: f64, final_time: f64, time_step: f64) -> Self {
        Self::new(GridSpec::uniform(start_time, final_time, time_step))
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn with_initial(mut self, name: impl Into<String>, value: f64) -> Self {
        self.initial.insert(name.into(), value);
        self
    }
}

/// Progress of a running simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    /// Index of the grid point just recorded
    pub step: usize,
    /// Total number of grid points
    pub total_steps: usize,
    /// Time of the grid point just recorded
    pub time: f64,
}

impl SimProgress {
    pub fn fraction_complete(&self) -> f64 {
        if self.total_steps == 0 {
            1.0
        } else {
            (self.step + 1) as f64 / self.total_steps as f64
        }
    }
}

/// Run a simulation with default options.
pub fn run_sim<M: CompartmentModel>(
    model: &M,
    request: &RunRequest,
) -> SimResult<Trajectory<M::State, M::Derived>> {
    run_sim_with_progress(model, request, &SimOptions::default(), None)
}

/// Run a simulation using fixed-step forward Euler.
///
/// Record `i` holds the state at grid point `i` and the rates evaluated at
/// that state, which are the rates used to produce record `i + 1`. The final
/// record still reports its forward rates.
///
/// A step that overflows any compartment to a non-finite value fails the
/// whole run with [`SimError::InvalidParameter`].
pub fn run_sim_with_progress<M: CompartmentModel>(
    model: &M,
    request: &RunRequest,
    opts: &SimOptions,
    mut progress: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<Trajectory<M::State, M::Derived>> {
    if opts.max_points == 0 {
        return Err(SimError::invalid("max_points must be positive"));
    }

    // Validate everything before producing any record
    let params = model.defaults().merged(&request.parameters, M::NAME)?;
    let grid = request.grid.build(opts.max_points)?;
    let mut state = model.initial_state(&params, &request.initial)?;

    let total_steps = grid.len();
    debug!(model = M::NAME, points = total_steps, "starting run");

    let integrator = ForwardEuler;
    let mut records = Vec::with_capacity(total_steps);
    let mut clamped_steps = 0;

    for (i, &time) in grid.points().iter().enumerate() {
        let rates = model.rates(&params, &state);
        let derived = model.derived(&params, &state, &rates);

        let next = match grid.interval(i) {
            Some(dt) => {
                let mut next = integrator.step(&state, &rates, dt);
                let overflow = next.values().into_iter().find(|(_, v)| !v.is_finite());
                if let Some((name, value)) = overflow {
                    return Err(SimError::invalid(format!(
                        "{name} became {value} after t = {time}; inputs are out of range"
                    )));
                }
                if next.clamp_non_negative() {
                    clamped_steps += 1;
                    trace!(
                        model = M::NAME,
                        step = i + 1,
                        "negative compartment clamped to zero"
                    );
                }
                Some(next)
            }
            None => None,
        };

        records.push(Record {
            time,
            state,
            derived,
        });

        if let Some(cb) = progress.as_mut() {
            let is_last = i + 1 == total_steps;
            if is_last || (opts.progress_every > 0 && (i + 1) % opts.progress_every == 0) {
                cb(SimProgress {
                    step: i,
                    total_steps,
                    time,
                });
            }
        }

        match next {
            Some(next) => state = next,
            None => break,
        }
    }

    debug!(model = M::NAME, points = records.len(), clamped_steps, "run complete");

    Ok(Trajectory::new(M::NAME, records, clamped_steps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogisticGrowth, Sir};

    #[test]
    fn sim_options_defaults() {
        let opts = SimOptions::default();
        assert_eq!(opts.max_points, 10_000_000);
        assert_eq!(opts.progress_every, 1000);
    }

    #[test]
    fn request_builders() {
        let req = RunRequest::uniform(0.0, 10.0, 0.5)
            .with_parameter("growth_rate", 0.1)
            .with_initial("population", 50.0);
        assert_eq!(req.grid, GridSpec::uniform(0.0, 10.0, 0.5));
        assert_eq!(req.parameters.get("growth_rate"), Some(&0.1));
        assert_eq!(req.initial.get("population"), Some(&50.0));

        let default = RunRequest::for_model(&Sir::default());
        assert_eq!(default.grid, GridSpec::uniform(0.0, 60.0, 0.125));
        assert!(default.parameters.is_empty());
    }

    #[test]
    fn first_record_is_initial_condition() {
        let model = LogisticGrowth::default();
        let req = RunRequest::uniform(0.0, 5.0, 1.0).with_initial("population", 42.0);
        let traj = run_sim(&model, &req).unwrap();
        assert_eq!(traj.first().state.population, 42.0);
        assert_eq!(traj.first().time, 0.0);
    }

    #[test]
    fn derived_rate_leads_out_of_each_point() {
        let model = LogisticGrowth::default();
        let req = RunRequest::uniform(0.0, 3.0, 1.0);
        let traj = run_sim(&model, &req).unwrap();

        for pair in traj.records().windows(2) {
            let expected = pair[0].state.population + pair[0].derived.growth_rate * 1.0;
            assert_eq!(pair[1].state.population, expected);
        }
        // Final record reports the rate at its own state
        let last = traj.last();
        let p = last.state.population;
        assert_eq!(last.derived.growth_rate, 0.02 * p * (1.0 - p / 10_000.0));
    }

    #[test]
    fn zero_max_points_rejected() {
        let model = LogisticGrowth::default();
        let opts = SimOptions {
            max_points: 0,
            progress_every: 0,
        };
        let err = run_sim_with_progress(&model, &RunRequest::for_model(&model), &opts, None)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParameter { .. }));
    }

    #[test]
    fn overflowing_step_is_an_error() {
        let model = LogisticGrowth::default();
        let req = RunRequest::uniform(0.0, 5.0, 1.0)
            .with_parameter("growth_rate", -1.0)
            .with_initial("population", 1e200);
        let err = run_sim(&model, &req).unwrap_err();
        match err {
            SimError::InvalidParameter { what } => assert!(what.contains("population")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn progress_reports_final_point() {
        let model = LogisticGrowth::default();
        let req = RunRequest::uniform(0.0, 10.0, 1.0);
        let opts = SimOptions {
            max_points: 100,
            progress_every: 4,
        };

        let mut events = Vec::new();
        let mut cb = |p: SimProgress| events.push(p);
        run_sim_with_progress(&model, &req, &opts, Some(&mut cb)).unwrap();

        let steps: Vec<_> = events.iter().map(|e| e.step).collect();
        assert_eq!(steps, vec![3, 7, 10]);
        let last = events.last().unwrap();
        assert_eq!(last.total_steps, 11);
        assert_eq!(last.fraction_complete(), 1.0);
    }
}
