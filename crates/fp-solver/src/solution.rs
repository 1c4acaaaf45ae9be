//! Converged per-node controls and derived quantities.

use crate::newton::NewtonResult;
use crate::node::NodeEvaluation;
use crate::throttle::{ThrottleBound, ThrottleStatus};
use fp_core::units::{Angle, Force, MassPerRange, MassRate, Pace, newtons, rad};
use fp_dynamics::Residual;
use fp_models::FlightCondition;

/// Solution at one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSolution {
    /// Solved angle of attack; `None` on the ground where alpha is an input
    pub alpha: Option<Angle>,
    pub thrust_required: Force,
    /// Thrust the engines deliver, when a propulsion model was evaluated
    pub thrust_delivered: Option<Force>,
    pub throttle: Option<f64>,
    /// Present only when the throttle balance ran
    pub throttle_status: Option<ThrottleStatus>,
    /// Fuel flow of the evaluated engines; `None` when no engine state is known
    pub fuel_flow: Option<MassRate>,
    /// dmass/dr [kg/m], alongside `fuel_flow`
    pub dmass_dr: Option<MassPerRange>,
    /// dt/dr [s/m]
    pub dt_dr: Pace,
    pub flight_path_angle: Option<Angle>,
    /// dgamma/dr [rad/m]
    pub flight_path_angle_rate: Option<f64>,
    pub lift: Force,
    pub drag: Force,
    pub load_factor: f64,
    pub normal_force: Force,
    pub fuselage_pitch: Angle,
    pub condition: FlightCondition,
    pub residual: Residual,
    pub iterations: usize,
}

impl NodeSolution {
    pub(crate) fn new(
        fc: &FlightCondition,
        evaluation: NodeEvaluation,
        newton: &NewtonResult,
        fuel_flow: Option<MassRate>,
        dmass_dr: Option<MassPerRange>,
    ) -> Self {
        let airborne = fc.is_airborne();
        let engine = evaluation.engine.as_ref();
        Self {
            alpha: airborne.then(|| rad(evaluation.alpha)),
            thrust_required: newtons(evaluation.thrust_req),
            thrust_delivered: engine.map(|e| e.output.thrust),
            throttle: engine.map(|e| e.throttle),
            throttle_status: engine.and_then(|e| e.status),
            fuel_flow,
            dmass_dr,
            dt_dr: fc.dt_dr,
            flight_path_angle: airborne.then_some(fc.gamma),
            flight_path_angle_rate: fc.gamma_rate,
            lift: evaluation.aero.lift,
            drag: evaluation.aero.drag,
            load_factor: evaluation.eom.load_factor,
            normal_force: newtons(evaluation.eom.normal_force),
            fuselage_pitch: rad(evaluation.eom.fuselage_pitch),
            condition: fc.clone(),
            residual: evaluation.eom.residual,
            iterations: newton.iterations,
        }
    }

    /// Bound the throttle is pinned at, if the balance saturated.
    pub fn saturation(&self) -> Option<ThrottleBound> {
        match self.throttle_status {
            Some(ThrottleStatus::Saturated { bound }) => Some(bound),
            _ => None,
        }
    }
}

/// Solution for the whole node vector, in node order.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlSolution {
    pub nodes: Vec<NodeSolution>,
    /// Newton iterations summed over nodes
    pub total_iterations: usize,
    /// Largest residual max-norm over nodes
    pub max_residual: f64,
}

impl ControlSolution {
    pub(crate) fn from_nodes(nodes: Vec<NodeSolution>) -> Self {
        let total_iterations = nodes.iter().map(|n| n.iterations).sum();
        let max_residual = nodes
            .iter()
            .map(|n| n.residual.max_norm())
            .fold(0.0, f64::max);
        Self {
            nodes,
            total_iterations,
            max_residual,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes whose throttle balance hit a bound, with that bound.
    ///
    /// Saturation means the required thrust is out of the engine's reach;
    /// the trajectory is infeasible there even though the solve succeeded.
    pub fn saturated_nodes(&self) -> Vec<(usize, ThrottleBound)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.saturation().map(|b| (i, b)))
            .collect()
    }
}
