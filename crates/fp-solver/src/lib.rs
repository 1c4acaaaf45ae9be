//! Per-node control inversion for a prescribed flight path.
//!
//! Given altitude and airspeed profiles, this crate finds at every node the
//! angle of attack and required thrust that make the point-mass equations of
//! motion consistent with the path, optionally balancing the throttle so the
//! engines deliver that thrust.
//!
//! Nodes are independent: each gets its own small Newton solve (two unknowns
//! airborne, one on the ground) and the nodes run in parallel. The nested
//! throttle balance is a one-dimensional bounded Newton solve that reports
//! saturation instead of failing.

pub mod error;
pub mod initialization;
pub mod jacobian;
pub mod newton;
mod node;
pub mod problem;
pub mod solution;
pub mod solve;
pub mod throttle;

pub use error::{SolverError, SolverResult, ThrottleError};
pub use initialization::InitialGuess;
pub use newton::{JacobianScheme, LineSearch, NewtonConfig, NewtonResult};
pub use problem::{ControlProblem, SolveOptions, TrajectoryNode};
pub use solution::{ControlSolution, NodeSolution};
pub use solve::solve;
pub use throttle::{
    ThrottleBound, ThrottleConfig, ThrottleSolution, ThrottleStatus, balance_throttle,
};
