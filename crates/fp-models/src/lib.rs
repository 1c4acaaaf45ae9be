//! fp-models: capability interfaces for the collaborators of the control solve.
//!
//! Provides:
//! - `FlightCondition`, the per-node state every model is evaluated at
//! - `AtmosphereModel` trait + U.S. 1976 `StandardAtmosphere`
//! - `AerodynamicsModel` trait + `DragPolar` reference model
//! - `PropulsionModel` trait + `ScaledEngine` reference model
//! - `ModelStack`, the caller-ordered list of active force models
//!
//! # Architecture
//!
//! The solver never inspects concrete model types. Callers decide which models
//! are active by building a `ModelStack`; every model reports its port lists for
//! the active `ModelContext` so the stack can be checked before a solve starts.
//!
//! # Example
//!
//! ```
//! use fp_core::units::{ft, m2, newtons};
//! use fp_models::{AtmosphereModel, DragPolar, ModelStack, ScaledEngine, StandardAtmosphere};
//!
//! let atmos = StandardAtmosphere::new();
//! let props = atmos.properties(ft(10_000.0)).unwrap();
//! assert!(props.density.value < 1.225);
//!
//! let stack = ModelStack::new()
//!     .with_aerodynamics(DragPolar::new("wing", m2(122.6), 0.2, 5.5, 0.022, 0.045))
//!     .with_propulsion(ScaledEngine::new("engines", 2, newtons(120_000.0), 1.6e-5));
//! assert!(stack.has_propulsion());
//! ```

pub mod aero;
pub mod atmosphere;
pub mod condition;
pub mod error;
pub mod propulsion;
pub mod stack;

// Re-exports for ergonomics
pub use aero::{AeroForces, AerodynamicsModel, DragPolar};
pub use atmosphere::{AtmosphereModel, AtmosphereState, StandardAtmosphere};
pub use condition::FlightCondition;
pub use error::{ModelError, ModelResult};
pub use propulsion::{EngineOutput, PropulsionModel, ScaledEngine};
pub use stack::{AeroMethod, FORCE_PORTS, ModelContext, ModelStack, SubsystemModel};
