//! Error types for dynamics calculations.

use fp_core::FpError;
use fp_models::ModelError;
use thiserror::Error;

/// Errors that can occur while deriving flight conditions or residuals.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynamicsError {
    /// Input outside the physical domain (negative altitude, zero airspeed, ...).
    #[error("Input out of domain for {what}: {value}")]
    InputDomain { what: &'static str, value: f64 },

    /// A derived quantity came out non-finite.
    #[error("Non-physical result for {what}")]
    NonPhysical { what: &'static str },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

pub type DynamicsResult<T> = Result<T, DynamicsError>;

impl From<FpError> for DynamicsError {
    fn from(e: FpError) -> Self {
        match e {
            FpError::NonFinite { what, .. } => DynamicsError::NonPhysical { what },
            FpError::OutOfRange { what, value } => DynamicsError::InputDomain { what, value },
        }
    }
}

/// Reject non-finite inputs as domain errors rather than letting NaN propagate.
pub(crate) fn check_input(value: f64, what: &'static str) -> DynamicsResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DynamicsError::InputDomain { what, value })
    }
}
