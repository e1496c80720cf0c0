//! Fixed-step time integrators.

use crate::model::Compartments;

/// Trait for time integrators.
pub trait Integrator {
    /// Advance `x` by one step of size `dt`, given its rate `xdot` at `x`.
    fn step<S: Compartments>(&self, x: &S, xdot: &S, dt: f64) -> S;
}

/// Forward Euler (explicit, 1st order): `x_new = x + dt * xdot`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<S: Compartments>(&self, x: &S, xdot: &S, dt: f64) -> S {
        x.add_scaled(xdot, dt)
    }
}
