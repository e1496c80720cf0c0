//! Named scalar values, parameter sets and per-run overrides.

use std::collections::BTreeMap;

use pd_core::ensure_finite;

use crate::error::{SimError, SimResult};

/// Partial mapping of name to value, merged onto defaults for one run.
pub type Overrides = BTreeMap<String, f64>;

/// A fixed set of named scalar fields.
pub trait NamedValues {
    /// Field names, in reporting order.
    const NAMES: &'static [&'static str];

    /// Look up a field by name.
    fn get(&self, name: &str) -> Option<f64>;

    /// All fields as `(name, value)` pairs in `NAMES` order.
    fn values(&self) -> Vec<(&'static str, f64)> {
        Self::NAMES
            .iter()
            .filter_map(|name| self.get(name).map(|v| (*name, v)))
            .collect()
    }
}

/// Model parameters: immutable for the duration of a run.
pub trait ParameterSet: NamedValues + Clone + std::fmt::Debug {
    /// Unit of each field, in `NAMES` order.
    const UNITS: &'static [&'static str];

    /// Unit of a field by name.
    fn unit(name: &str) -> Option<&'static str> {
        Self::NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| Self::UNITS.get(i).copied())
    }

    /// Set a field by name. Returns `false` for unknown names.
    fn set(&mut self, name: &str, value: f64) -> bool;

    /// Check domain constraints (e.g. positive divisors).
    fn validate(&self) -> SimResult<()>;

    /// Produce a new parameter set with `overrides` applied on top of `self`.
    ///
    /// Unknown keys are rejected so typos surface instead of silently running
    /// with defaults.
    fn merged(&self, overrides: &Overrides, model: &'static str) -> SimResult<Self> {
        let mut out = self.clone();
        apply_overrides(overrides, model, |name, value| out.set(name, value))?;
        out.validate()?;
        Ok(out)
    }
}

/// Feed each override through `set`, rejecting non-finite values and names
/// that `set` does not recognise.
pub(crate) fn apply_overrides<F>(
    overrides: &Overrides,
    model: &'static str,
    mut set: F,
) -> SimResult<()>
where
    F: FnMut(&str, f64) -> bool,
{
    for (name, &value) in overrides {
        ensure_finite(value, name)?;
        if !set(name, value) {
            return Err(SimError::UnknownParameter {
                name: name.clone(),
                model,
            });
        }
    }
    Ok(())
}

/// Require `value > 0`.
pub(crate) fn ensure_positive(value: f64, what: &str) -> SimResult<()> {
    ensure_finite(value, what)?;
    if value <= 0.0 {
        return Err(SimError::invalid(format!(
            "{what} must be positive (got {value})"
        )));
    }
    Ok(())
}
