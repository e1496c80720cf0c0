//! Logistic population growth: `dP/dt = r * P * (1 - P / K)`.

use serde::{Deserialize, Serialize};

use pd_core::ensure_non_negative;

use crate::error::SimResult;
use crate::grid::GridSpec;
use crate::model::{CompartmentModel, Compartments};
use crate::params::{NamedValues, Overrides, ParameterSet, apply_overrides, ensure_positive};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Intrinsic growth rate `r` (1/time)
    pub growth_rate: f64,
    /// Carrying capacity `K` (individuals), must be positive
    pub carrying_capacity: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            growth_rate: 0.02,
            carrying_capacity: 10_000.0,
        }
    }
}

impl NamedValues for LogisticParams {
    const NAMES: &'static [&'static str] = &["growth_rate", "carrying_capacity"];

    fn get(&self, name: &str) -> Option<f64> {
        match name {
            "growth_rate" => Some(self.growth_rate),
            "carrying_capacity" => Some(self.carrying_capacity),
            _ => None,
        }
    }
}

impl ParameterSet for LogisticParams {
    const UNITS: &'static [&'static str] = &["1/Time", "Individuals"];

    fn set(&mut self, name: &str, value: f64) -> bool {
        match name {
            "growth_rate" => self.growth_rate = value,
            "carrying_capacity" => self.carrying_capacity = value,
            _ => return false,
        }
        true
    }

    fn validate(&self) -> SimResult<()> {
        ensure_positive(self.carrying_capacity, "carrying_capacity")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticState {
    pub population: f64,
}

impl Default for LogisticState {
    fn default() -> Self {
        Self { population: 1000.0 }
    }
}

impl NamedValues for LogisticState {
    const NAMES: &'static [&'static str] = &["population"];

    fn get(&self, name: &str) -> Option<f64> {
        match name {
            "population" => Some(self.population),
            _ => None,
        }
    }
}

impl Compartments for LogisticState {
    fn set(&mut self, name: &str, value: f64) -> bool {
        match name {
            "population" => self.population = value,
            _ => return false,
        }
        true
    }

    fn add_scaled(&self, rate: &Self, dt: f64) -> Self {
        Self {
            population: self.population + rate.population * dt,
        }
    }

    fn clamp_non_negative(&mut self) -> bool {
        let (population, clamped) = pd_core::clamp_non_negative(self.population);
        self.population = population;
        clamped
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LogisticDiagnostics {
    /// `dP/dt` at this point (the rate leading out of it)
    pub growth_rate: f64,
    /// Echo of `K`
    pub carrying_capacity: f64,
}

impl NamedValues for LogisticDiagnostics {
    const NAMES: &'static [&'static str] = &["growth_rate", "carrying_capacity"];

    fn get(&self, name: &str) -> Option<f64> {
        match name {
            "growth_rate" => Some(self.growth_rate),
            "carrying_capacity" => Some(self.carrying_capacity),
            _ => None,
        }
    }
}

/// Single-compartment logistic growth model.
#[derive(Clone, Debug, Default)]
pub struct LogisticGrowth {
    params: LogisticParams,
    initial: LogisticState,
}

impl LogisticGrowth {
    pub fn new(params: LogisticParams, initial: LogisticState) -> Self {
        Self { params, initial }
    }
}

impl CompartmentModel for LogisticGrowth {
    type Params = LogisticParams;
    type State = LogisticState;
    type Derived = LogisticDiagnostics;

    const NAME: &'static str = "logistic";
    const DESCRIPTION: &'static str = "Logistic population growth towards a carrying capacity";

    fn defaults(&self) -> &LogisticParams {
        &self.params
    }

    fn default_grid(&self) -> GridSpec {
        GridSpec::uniform(0.0, 1000.0, 1.0)
    }

    fn initial_state(
        &self,
        _params: &LogisticParams,
        overrides: &Overrides,
    ) -> SimResult<LogisticState> {
        let mut state = self.initial;
        apply_overrides(overrides, Self::NAME, |name, value| state.set(name, value))?;
        ensure_non_negative(state.population, "initial population")?;
        Ok(state)
    }

    fn rates(&self, params: &LogisticParams, state: &LogisticState) -> LogisticState {
        let p = state.population;
        LogisticState {
            population: params.growth_rate * p * (1.0 - p / params.carrying_capacity),
        }
    }

    fn derived(
        &self,
        params: &LogisticParams,
        _state: &LogisticState,
        rates: &LogisticState,
    ) -> LogisticDiagnostics {
        LogisticDiagnostics {
            growth_rate: rates.population,
            carrying_capacity: params.carrying_capacity,
        }
    }
}
