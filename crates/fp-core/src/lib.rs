//! fp-core: stable foundation for flightpath.
//!
//! Contains:
//! - units (uom SI types + constructors, path-rate aliases)
//! - numeric (Real + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{FpError, FpResult};
pub use numeric::*;
pub use units::*;
