//! Error types for solver operations.

use fp_dynamics::DynamicsError;
use fp_models::ModelError;
use thiserror::Error;

/// Errors that can occur during the control solve.
///
/// Any of these aborts the whole node vector; no partial solution is returned.
/// Throttle saturation is not an error, see [`crate::ThrottleStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Node {node}: invalid input: {source}")]
    InputDomain { node: usize, source: DynamicsError },

    #[error("Node {node}: non-physical trial state: {what}")]
    NonPhysical { node: usize, what: &'static str },

    #[error("Node {node}: model error: {source}")]
    Model { node: usize, source: ModelError },

    #[error("Node {node}: singular Jacobian at iteration {iteration}")]
    SingularJacobian { node: usize, iteration: usize },

    #[error("Node {node}: no convergence after {iterations} iterations, residual = {residual:e}")]
    NonConvergence {
        node: usize,
        iterations: usize,
        residual: f64,
    },

    #[error("Node {node}: throttle balance failed: {source}")]
    Throttle { node: usize, source: ThrottleError },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    /// Index of the node the failure belongs to, if any.
    pub fn node(&self) -> Option<usize> {
        match self {
            SolverError::ProblemSetup { .. } => None,
            SolverError::InputDomain { node, .. }
            | SolverError::NonPhysical { node, .. }
            | SolverError::Model { node, .. }
            | SolverError::SingularJacobian { node, .. }
            | SolverError::NonConvergence { node, .. }
            | SolverError::Throttle { node, .. } => Some(*node),
        }
    }

    /// Map a dynamics failure at `node`: domain errors stay domain errors,
    /// everything else means the trial state went non-physical.
    pub(crate) fn from_dynamics(node: usize, err: DynamicsError) -> Self {
        match err {
            DynamicsError::Model(source) => SolverError::Model { node, source },
            DynamicsError::NonPhysical { what } => SolverError::NonPhysical { node, what },
            source @ DynamicsError::InputDomain { .. } => SolverError::InputDomain { node, source },
        }
    }
}

impl From<ModelError> for SolverError {
    fn from(e: ModelError) -> Self {
        SolverError::ProblemSetup {
            what: e.to_string(),
        }
    }
}

/// Errors of the nested throttle balance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThrottleError {
    #[error("Thrust does not respond to throttle at throttle = {throttle}")]
    Singular { throttle: f64 },

    #[error("No convergence after {iterations} iterations, residual = {residual:e}")]
    NonConvergence { iterations: usize, residual: f64 },

    #[error("Propulsion model error: {0}")]
    Model(#[from] ModelError),
}
