use crate::FpError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FpError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FpError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, FpError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(FpError::OutOfRange { what, value: v })
    }
}

/// Largest absolute entry, 0 for an empty slice.
pub fn max_abs(values: &[Real]) -> Real {
    values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}
