use crate::{CoreError, CoreResult};

pub type Real = f64;

/// Absolute and relative slack for comparing converted quantities.
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

/// True when `a` and `b` differ by at most `tol.abs`, or by `tol.rel` of the larger magnitude.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Reject NaN and infinities, naming the offending field.
pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Parse catalog text into a finite number, absorbing anything else as unknown.
pub fn parse_lenient(text: &str) -> Option<Real> {
    text.trim().parse::<Real>().ok().filter(|v| v.is_finite())
}

/// `Some(v)` only for strictly positive finite values.
pub fn positive(v: Real) -> Option<Real> {
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Symmetric inclusive percentage window around `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub lo: Real,
    pub hi: Real,
}

impl Band {
    pub fn around(target: Real, tolerance_pct: Real) -> Self {
        let spread = tolerance_pct / 100.0;
        Self {
            lo: target * (1.0 - spread),
            hi: target * (1.0 + spread),
        }
    }

    pub fn contains(&self, v: Real) -> bool {
        v >= self.lo && v <= self.hi
    }
}
