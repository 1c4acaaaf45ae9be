//! Model evaluation errors.

use fp_core::FpError;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while evaluating atmosphere, aerodynamics or propulsion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Non-physical values (negative density, NaN forces, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Value out of the model's valid range.
    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },

    /// A model advertises a port the stack cannot wire.
    #[error("Model '{model}' has invalid port '{port}': {reason}")]
    InvalidPort {
        model: String,
        port: String,
        reason: &'static str,
    },

    /// Stack composition error (missing required model kind).
    #[error("Invalid model stack: {what}")]
    InvalidStack { what: &'static str },

    /// Caller-supplied model failed for its own reasons.
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl From<FpError> for ModelError {
    fn from(err: FpError) -> Self {
        match err {
            FpError::NonFinite { what, .. } => ModelError::NonPhysical { what },
            FpError::OutOfRange { what, value } => ModelError::OutOfRange { what, value },
        }
    }
}
