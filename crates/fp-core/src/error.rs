use thiserror::Error;

pub type FpResult<T> = Result<T, FpError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FpError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Value out of range for {what}: {value}")]
    OutOfRange { what: &'static str, value: f64 },
}
