//! fp-dynamics: point-mass flight dynamics along a prescribed path.
//!
//! Provides the algebraic pieces of the control solve:
//! - Flight-path angle and its range rate from the altitude profile
//! - Flight conditions from the airspeed input (TAS, EAS or Mach)
//! - Equations-of-motion residuals for a trial angle of attack and thrust
//! - Fuel-mass depletion rate per unit range
//!
//! Everything here is a deterministic function of its inputs with no
//! iteration, so nodes can be evaluated independently and in parallel.

pub mod eom;
pub mod error;
pub mod flight_conditions;
pub mod gamma;
pub mod mass_rate;

// Re-exports
pub use eom::{AircraftConfig, EomOutput, Residual, evaluate_eom};
pub use error::{DynamicsError, DynamicsResult};
pub use flight_conditions::{KinematicInput, SpeedType, compute_flight_condition};
pub use gamma::{FlightPathAngle, flight_path_angle};
pub use mass_rate::mass_rate;
