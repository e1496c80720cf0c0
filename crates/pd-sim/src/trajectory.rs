//! Recorded simulation output.

use serde::Serialize;

use crate::params::NamedValues;

/// One grid point: time, state, and the derived quantities at that state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record<S, D> {
    pub time: f64,
    pub state: S,
    pub derived: D,
}

impl<S: NamedValues, D: NamedValues> Record<S, D> {
    /// Value of a compartment or derived quantity by name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.state.get(name).or_else(|| self.derived.get(name))
    }
}

/// Location and size of a maximum over a trajectory.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Peak {
    pub time: f64,
    pub value: f64,
}

/// Time-ordered records produced by one run. Never empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trajectory<S, D> {
    model: &'static str,
    records: Vec<Record<S, D>>,
    clamped_steps: usize,
}

impl<S: NamedValues, D: NamedValues> Trajectory<S, D> {
    pub(crate) fn new(
        model: &'static str,
        records: Vec<Record<S, D>>,
        clamped_steps: usize,
    ) -> Self {
        debug_assert!(!records.is_empty());
        Self {
            model,
            records,
            clamped_steps,
        }
    }

    pub fn model(&self) -> &'static str {
        self.model
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record<S, D>] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record<S, D>> {
        self.records.iter()
    }

    /// Number of steps in which at least one compartment was clamped to zero.
    pub fn clamped_steps(&self) -> usize {
        self.clamped_steps
    }

    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.time).collect()
    }

    pub fn first(&self) -> &Record<S, D> {
        &self.records[0]
    }

    pub fn last(&self) -> &Record<S, D> {
        &self.records[self.records.len() - 1]
    }

    pub fn final_state(&self) -> &S {
        &self.last().state
    }

    /// Compartment names followed by derived quantity names.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        S::NAMES.iter().chain(D::NAMES.iter()).copied()
    }

    /// Full time series of a compartment or derived quantity.
    pub fn series(&self, name: &str) -> Option<Vec<f64>> {
        self.records.iter().map(|r| r.value(name)).collect()
    }

    /// Value of `name` at the final grid point.
    pub fn final_value(&self, name: &str) -> Option<f64> {
        self.last().value(name)
    }

    /// Maximum of `name` over the run; ties resolve to the earliest time.
    pub fn max_of(&self, name: &str) -> Option<Peak> {
        let mut best: Option<Peak> = None;
        for record in &self.records {
            let value = record.value(name)?;
            match best {
                Some(peak) if value <= peak.value => {}
                _ => {
                    best = Some(Peak {
                        time: record.time,
                        value,
                    })
                }
            }
        }
        best
    }
}

impl<'a, S, D> IntoIterator for &'a Trajectory<S, D> {
    type Item = &'a Record<S, D>;
    type IntoIter = std::slice::Iter<'a, Record<S, D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
