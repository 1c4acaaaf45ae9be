//! Starting controls for the per-node balance.
//!
//! A solve either starts every node from the same `InitialGuess` or, when a
//! previous `ControlSolution` for the same nodes is supplied, warm-starts each
//! node from that node's converged controls.

use crate::error::{SolverError, SolverResult};
use crate::solution::NodeSolution;
use fp_core::units::{Angle, Force, newtons, rad};

/// Uniform starting point for alpha, required thrust and throttle.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialGuess {
    pub alpha: Angle,
    pub thrust_req: Force,
    /// Start of the inner throttle balance, in [0, 1]
    pub throttle: f64,
}

impl InitialGuess {
    /// 0 rad, 100 N, half throttle.
    pub fn standard() -> Self {
        Self {
            alpha: rad(0.0),
            thrust_req: newtons(100.0),
            throttle: 0.5,
        }
    }

    pub(crate) fn validate(&self) -> SolverResult<()> {
        if !self.alpha.value.is_finite() || !self.thrust_req.value.is_finite() {
            return Err(SolverError::ProblemSetup {
                what: "initial guess must be finite".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.throttle) {
            return Err(SolverError::ProblemSetup {
                what: format!("initial throttle {} outside [0, 1]", self.throttle),
            });
        }
        Ok(())
    }
}

/// Raw SI starting controls for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct NodeStart {
    pub alpha: f64,
    pub thrust_req: f64,
    pub throttle: f64,
}

impl NodeStart {
    pub(crate) fn new(guess: &InitialGuess, warm: Option<&NodeSolution>) -> Self {
        let cold = Self {
            alpha: guess.alpha.value,
            thrust_req: guess.thrust_req.value,
            throttle: guess.throttle,
        };
        match warm {
            None => cold,
            Some(prev) => Self {
                alpha: prev.alpha.map_or(cold.alpha, |a| a.value),
                thrust_req: prev.thrust_required.value,
                throttle: prev.throttle.map_or(cold.throttle, |t| t.clamp(0.0, 1.0)),
            },
        }
    }
}
