//! Time grid construction.

use serde::{Deserialize, Serialize};

use pd_core::ensure_finite;

use crate::error::{SimError, SimResult};

/// Relative tolerance used to snap `(end - start) / step` onto an integer.
const ALIGN_TOL: f64 = 1e-9;

/// Largest grid built when the caller does not choose a limit.
pub const DEFAULT_MAX_POINTS: usize = 10_000_000;

/// How a run's time grid is described.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridSpec {
    /// `start, start + step, ...` up to and including the first point `>= end`.
    Uniform { start: f64, end: f64, step: f64 },
    /// Caller-supplied, non-decreasing time points.
    Explicit { points: Vec<f64> },
}

impl GridSpec {
    pub fn uniform(start: f64, end: f64, step: f64) -> Self {
        GridSpec::Uniform { start, end, step }
    }

    /// Materialize the grid, refusing grids longer than `max_points`.
    pub fn build(&self, max_points: usize) -> SimResult<TimeGrid> {
        match self {
            GridSpec::Uniform { start, end, step } => {
                TimeGrid::uniform_bounded(*start, *end, *step, max_points)
            }
            GridSpec::Explicit { points } => {
                if points.len() > max_points {
                    return Err(SimError::invalid(format!(
                        "grid has {} points, limit is {max_points}",
                        points.len()
                    )));
                }
                TimeGrid::explicit(points.clone())
            }
        }
    }
}

/// An ordered, non-decreasing sequence of time points.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    points: Vec<f64>,
    /// Exact step for uniform grids; explicit grids use point differences.
    step: Option<f64>,
}

impl TimeGrid {
    /// Uniform grid of at most [`DEFAULT_MAX_POINTS`] points.
    pub fn uniform(start: f64, end: f64, step: f64) -> SimResult<Self> {
        Self::uniform_bounded(start, end, step, DEFAULT_MAX_POINTS)
    }

    fn uniform_bounded(start: f64, end: f64, step: f64, max_points: usize) -> SimResult<Self> {
        let count = Self::uniform_len(start, end, step)?;
        if count > max_points {
            return Err(SimError::invalid(format!(
                "grid has {count} points, limit is {max_points}"
            )));
        }
        let points = (0..count).map(|i| start + i as f64 * step).collect();
        Ok(Self {
            points,
            step: Some(step),
        })
    }

    /// Grid from explicit points. Must be non-empty, finite and non-decreasing.
    pub fn explicit(points: Vec<f64>) -> SimResult<Self> {
        if points.is_empty() {
            return Err(SimError::invalid("time grid must contain at least one point"));
        }
        for &t in &points {
            ensure_finite(t, "time point")?;
        }
        if let Some(w) = points.windows(2).find(|w| w[1] < w[0]) {
            return Err(SimError::invalid(format!(
                "time grid must be non-decreasing ({} follows {})",
                w[1], w[0]
            )));
        }
        Ok(Self { points, step: None })
    }

    /// Number of points a uniform grid over `[start, end]` with `step` has.
    ///
    /// End-aligned grids get `floor((end - start) / step) + 1` points; otherwise
    /// one extra point past `end` closes the interval.
    pub fn uniform_len(start: f64, end: f64, step: f64) -> SimResult<usize> {
        ensure_finite(start, "start_time")?;
        ensure_finite(end, "final_time")?;
        ensure_finite(step, "time_step")?;
        if step <= 0.0 {
            return Err(SimError::invalid(format!(
                "time_step must be positive (got {step})"
            )));
        }
        if end < start {
            return Err(SimError::invalid(format!(
                "final_time ({end}) must not precede start_time ({start})"
            )));
        }

        let ratio = (end - start) / step;
        if !ratio.is_finite() || ratio >= usize::MAX as f64 {
            return Err(SimError::invalid("time grid is too long"));
        }
        let nearest = ratio.round();
        let intervals = if (ratio - nearest).abs() <= ALIGN_TOL * nearest.max(1.0) {
            nearest
        } else {
            ratio.ceil()
        };
        Ok(intervals as usize + 1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn start(&self) -> f64 {
        self.points[0]
    }

    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Step from point `i` to point `i + 1`; `None` at the last point.
    pub fn interval(&self, i: usize) -> Option<f64> {
        if i + 1 >= self.points.len() {
            return None;
        }
        Some(match self.step {
            Some(step) => step,
            None => self.points[i + 1] - self.points[i],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_grid_includes_end() {
        let grid = TimeGrid::uniform(0.0, 1000.0, 1.0).unwrap();
        assert_eq!(grid.len(), 1001);
        assert_eq!(grid.start(), 0.0);
        assert_eq!(grid.end(), 1000.0);
    }

    #[test]
    fn fractional_step_grid() {
        let grid = TimeGrid::uniform(0.0, 60.0, 0.125).unwrap();
        assert_eq!(grid.len(), 481);
        assert_eq!(grid.end(), 60.0);
        assert_eq!(grid.interval(0), Some(0.125));
        assert_eq!(grid.interval(480), None);
    }

    #[test]
    fn float_noise_does_not_add_a_point() {
        // 0.3 / 0.1 evaluates to 2.9999999999999996
        let grid = TimeGrid::uniform(0.0, 0.3, 0.1).unwrap();
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn unaligned_end_gets_closing_point() {
        let grid = TimeGrid::uniform(0.0, 10.0, 3.0).unwrap();
        assert_eq!(grid.points(), &[0.0, 3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn degenerate_grid_has_one_point() {
        let grid = TimeGrid::uniform(5.0, 5.0, 1.0).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.interval(0), None);
    }

    #[test]
    fn invalid_bounds_rejected() {
        assert!(matches!(
            TimeGrid::uniform(0.0, 1.0, 0.0),
            Err(SimError::InvalidParameter { .. })
        ));
        assert!(matches!(
            TimeGrid::uniform(0.0, 1.0, -0.5),
            Err(SimError::InvalidParameter { .. })
        ));
        assert!(matches!(
            TimeGrid::uniform(2.0, 1.0, 0.5),
            Err(SimError::InvalidParameter { .. })
        ));
        assert!(matches!(
            TimeGrid::uniform(0.0, f64::INFINITY, 1.0),
            Err(SimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn oversized_uniform_grid_rejected_before_allocating() {
        assert!(matches!(
            TimeGrid::uniform(0.0, 1e18, 1.0),
            Err(SimError::InvalidParameter { .. })
        ));
        let at_limit = (DEFAULT_MAX_POINTS - 1) as f64;
        assert!(TimeGrid::uniform_len(0.0, at_limit, 1.0).is_ok());
        assert!(TimeGrid::uniform(0.0, at_limit + 1.0, 1.0).is_err());
    }

    #[test]
    fn length_limit_enforced() {
        let spec = GridSpec::uniform(0.0, 100.0, 1.0);
        assert!(spec.build(101).is_ok());
        assert!(spec.build(100).is_err());
    }

    #[test]
    fn explicit_grid_uses_point_differences() {
        let grid = TimeGrid::explicit(vec![0.0, 0.5, 2.0, 2.0]).unwrap();
        assert_eq!(grid.interval(0), Some(0.5));
        assert_eq!(grid.interval(1), Some(1.5));
        assert_eq!(grid.interval(2), Some(0.0));
    }

    #[test]
    fn explicit_grid_validation() {
        assert!(TimeGrid::explicit(vec![]).is_err());
        assert!(TimeGrid::explicit(vec![0.0, 2.0, 1.0]).is_err());
        assert!(TimeGrid::explicit(vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn grid_spec_serde_shape() {
        let spec: GridSpec =
            serde_json::from_str(r#"{"type":"uniform","start":0.0,"end":60.0,"step":0.125}"#)
                .unwrap();
        assert_eq!(spec, GridSpec::uniform(0.0, 60.0, 0.125));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn aligned_length_matches_floor_formula(
            start in -100.0_f64..100.0,
            steps in 0_usize..2000,
            step_exp in -3_i32..3,
        ) {
            let step = 2.0_f64.powi(step_exp);
            let end = start + steps as f64 * step;
            let grid = TimeGrid::uniform(start, end, step).unwrap();
            prop_assert_eq!(grid.len(), steps + 1);
        }

        #[test]
        fn grid_is_non_decreasing_and_covers_end(
            start in -50.0_f64..50.0,
            span in 0.0_f64..500.0,
            step in 0.01_f64..10.0,
        ) {
            let grid = TimeGrid::uniform(start, start + span, step).unwrap();
            prop_assert!(grid.points().windows(2).all(|w| w[0] <= w[1]));
            prop_assert_eq!(grid.start(), start);
            prop_assert!(grid.end() >= start + span - 1e-9 * (span.max(1.0) + 1.0));
        }
    }
}
