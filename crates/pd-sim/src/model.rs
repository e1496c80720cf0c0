//! CompartmentModel trait for pluggable difference-equation systems.

use std::fmt::Debug;

use crate::error::SimResult;
use crate::grid::GridSpec;
use crate::params::{NamedValues, Overrides, ParameterSet};

/// A fixed-size vector of named, non-negative compartments.
pub trait Compartments: NamedValues + Clone + Debug + PartialEq {
    /// Set a compartment by name. Returns `false` for unknown names.
    fn set(&mut self, name: &str, value: f64) -> bool;

    /// Element-wise `self + rate * dt`.
    fn add_scaled(&self, rate: &Self, dt: f64) -> Self;

    /// Force negative compartments up to zero. Returns whether anything changed.
    fn clamp_non_negative(&mut self) -> bool;
}

/// Trait for compartmental models advanced by explicit difference equations.
///
/// A model holds only its default parameters and initial state; every run
/// merges overrides onto copies of those, so a model can be shared across
/// concurrent runs.
///
/// Rates are a pure function of `(params, state)`: the same `State` type is
/// used for the time derivative `dx/dt`.
pub trait CompartmentModel {
    type Params: ParameterSet;
    type State: Compartments;
    /// Quantities reported alongside state but never fed back.
    type Derived: NamedValues + Clone + Debug + PartialEq;

    /// Model name, used in errors and logs.
    const NAME: &'static str;

    /// One-line human-readable description.
    const DESCRIPTION: &'static str;

    /// Built-in default parameters.
    fn defaults(&self) -> &Self::Params;

    /// Grid used when the caller does not supply one.
    fn default_grid(&self) -> GridSpec;

    /// Initial state for a run: model defaults with `overrides` applied.
    fn initial_state(&self, params: &Self::Params, overrides: &Overrides)
    -> SimResult<Self::State>;

    /// Instantaneous rates `dx/dt` at `state`.
    fn rates(&self, params: &Self::Params, state: &Self::State) -> Self::State;

    /// Derived quantities at `state`, given the rates already computed there.
    fn derived(
        &self,
        params: &Self::Params,
        state: &Self::State,
        rates: &Self::State,
    ) -> Self::Derived;
}
