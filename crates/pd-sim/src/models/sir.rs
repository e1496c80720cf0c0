//! SIR epidemic model.
//!
//! Three compartments (susceptible, infected, recovered) with
//!
//! ```text
//! infection = infectivity * contact_rate * S * I / N
//! recovery  = I / recovery_time
//! dS = -infection
//! dI =  infection - recovery
//! dR =  recovery
//! ```

use serde::{Deserialize, Serialize};

use pd_core::ensure_non_negative;

use crate::error::{SimError, SimResult};
use crate::grid::GridSpec;
use crate::model::{CompartmentModel, Compartments};
use crate::params::{NamedValues, Overrides, ParameterSet, apply_overrides, ensure_positive};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SirParams {
    /// Contacts per person per day
    pub contact_rate: f64,
    /// Probability of infection per contact
    pub infectivity: f64,
    /// Mean infectious period (days)
    pub recovery_time: f64,
    /// Population size `N` used for mixing
    pub total_population: f64,
}

impl Default for SirParams {
    fn default() -> Self {
        Self {
            contact_rate: 10.0,
            infectivity: 0.015,
            recovery_time: 5.0,
            total_population: 1000.0,
        }
    }
}

impl NamedValues for SirParams {
    const NAMES: &'static [&'static str] = &[
        "contact_rate",
        "infectivity",
        "recovery_time",
        "total_population",
    ];

    fn get(&self, name: &str) -> Option<f64> {
        match name {
            "contact_rate" => Some(self.contact_rate),
            "infectivity" => Some(self.infectivity),
            "recovery_time" => Some(self.recovery_time),
            "total_population" => Some(self.total_population),
            _ => None,
        }
    }
}

impl ParameterSet for SirParams {
    const UNITS: &'static [&'static str] = &["1/Day", "Dimensionless", "Day", "Person"];

    fn set(&mut self, name: &str, value: f64) -> bool {
        match name {
            "contact_rate" => self.contact_rate = value,
            "infectivity" => self.infectivity = value,
            "recovery_time" => self.recovery_time = value,
            "total_population" => self.total_population = value,
            _ => return false,
        }
        true
    }

    fn validate(&self) -> SimResult<()> {
        ensure_non_negative(self.contact_rate, "contact_rate")?;
        ensure_non_negative(self.infectivity, "infectivity")?;
        ensure_positive(self.recovery_time, "recovery_time")?;
        ensure_positive(self.total_population, "total_population")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SirState {
    pub susceptible: f64,
    pub infected: f64,
    pub recovered: f64,
}

impl SirState {
    pub fn total(&self) -> f64 {
        self.susceptible + self.infected + self.recovered
    }
}

impl NamedValues for SirState {
    const NAMES: &'static [&'static str] = &["susceptible", "infected", "recovered"];

    fn get(&self, name: &str) -> Option<f64> {
        match name {
            "susceptible" => Some(self.susceptible),
            "infected" => Some(self.infected),
            "recovered" => Some(self.recovered),
            _ => None,
        }
    }
}

impl Compartments for SirState {
    fn set(&mut self, name: &str, value: f64) -> bool {
        match name {
            "susceptible" => self.susceptible = value,
            "infected" => self.infected = value,
            "recovered" => self.recovered = value,
            _ => return false,
        }
        true
    }

    fn add_scaled(&self, rate: &Self, dt: f64) -> Self {
        Self {
            susceptible: self.susceptible + rate.susceptible * dt,
            infected: self.infected + rate.infected * dt,
            recovered: self.recovered + rate.recovered * dt,
        }
    }

    fn clamp_non_negative(&mut self) -> bool {
        let (s, cs) = pd_core::clamp_non_negative(self.susceptible);
        let (i, ci) = pd_core::clamp_non_negative(self.infected);
        let (r, cr) = pd_core::clamp_non_negative(self.recovered);
        *self = Self {
            susceptible: s,
            infected: i,
            recovered: r,
        };
        cs || ci || cr
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SirDiagnostics {
    /// New infections per day at this point
    pub infection_rate: f64,
    /// Recoveries per day at this point
    pub recovery_rate: f64,
}

impl NamedValues for SirDiagnostics {
    const NAMES: &'static [&'static str] = &["infection_rate", "recovery_rate"];

    fn get(&self, name: &str) -> Option<f64> {
        match name {
            "infection_rate" => Some(self.infection_rate),
            "recovery_rate" => Some(self.recovery_rate),
            _ => None,
        }
    }
}

/// SIR epidemic model.
///
/// Unless overridden, a run starts with `initial_infected` infected, nobody
/// recovered, and everyone else susceptible.
#[derive(Clone, Debug)]
pub struct Sir {
    params: SirParams,
    initial_infected: f64,
}

impl Default for Sir {
    fn default() -> Self {
        Self {
            params: SirParams::default(),
            initial_infected: 1.0,
        }
    }
}

impl Sir {
    pub fn new(params: SirParams, initial_infected: f64) -> Self {
        Self {
            params,
            initial_infected,
        }
    }

    fn flows(params: &SirParams, state: &SirState) -> (f64, f64) {
        let infection =
            params.contact_rate * params.infectivity * state.susceptible * state.infected
                / params.total_population;
        let recovery = state.infected / params.recovery_time;
        (infection, recovery)
    }
}

impl CompartmentModel for Sir {
    type Params = SirParams;
    type State = SirState;
    type Derived = SirDiagnostics;

    const NAME: &'static str = "sir";
    const DESCRIPTION: &'static str = "SIR epidemic: susceptible, infected and recovered";

    fn defaults(&self) -> &SirParams {
        &self.params
    }

    fn default_grid(&self) -> GridSpec {
        GridSpec::uniform(0.0, 60.0, 0.125)
    }

    fn initial_state(&self, params: &SirParams, overrides: &Overrides) -> SimResult<SirState> {
        let mut state = SirState {
            susceptible: 0.0,
            infected: self.initial_infected,
            recovered: 0.0,
        };
        apply_overrides(overrides, Self::NAME, |name, value| state.set(name, value))?;

        if !overrides.contains_key("susceptible") {
            state.susceptible = params.total_population - state.infected - state.recovered;
            if state.susceptible < 0.0 {
                return Err(SimError::invalid(format!(
                    "initial infected + recovered ({}) exceed total_population ({})",
                    state.infected + state.recovered,
                    params.total_population
                )));
            }
        }

        for (name, value) in state.values() {
            ensure_non_negative(value, name)?;
        }
        Ok(state)
    }

    fn rates(&self, params: &SirParams, state: &SirState) -> SirState {
        let (infection, recovery) = Self::flows(params, state);
        SirState {
            susceptible: -infection,
            infected: infection - recovery,
            recovered: recovery,
        }
    }

    fn derived(&self, params: &SirParams, state: &SirState, _rates: &SirState) -> SirDiagnostics {
        let (infection_rate, recovery_rate) = Self::flows(params, state);
        SirDiagnostics {
            infection_rate,
            recovery_rate,
        }
    }
}
