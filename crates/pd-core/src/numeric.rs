use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite {
            what: what.to_string(),
            value: v,
        })
    }
}

/// Finite and >= 0.
pub fn ensure_non_negative(v: Real, what: &str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(CoreError::Negative {
            what: what.to_string(),
            value: v,
        });
    }
    Ok(v)
}

/// Force values below zero up to zero. Returns the value and whether it was clamped.
#[inline]
pub fn clamp_non_negative(v: Real) -> (Real, bool) {
    if v < 0.0 { (0.0, true) } else { (v, false) }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clamped_value_is_never_negative(v in -1.0e12_f64..1.0e12_f64) {
            let (out, clamped) = clamp_non_negative(v);
            prop_assert!(out >= 0.0);
            prop_assert_eq!(clamped, v < 0.0);
        }
    }
}
