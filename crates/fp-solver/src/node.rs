//! Residual evaluation for a single trajectory node.
//!
//! The unknown vector is `[alpha, thrust_req]` airborne and `[thrust_req]`
//! on the ground; residual rows follow `Residual::components`.

use crate::error::{SolverError, SolverResult};
use crate::problem::{ControlProblem, SolveOptions, TrajectoryNode};
use crate::throttle::{ThrottleStatus, balance_throttle};
use fp_dynamics::{AircraftConfig, EomOutput, compute_flight_condition, evaluate_eom};
use fp_models::{
    AeroForces, AtmosphereModel, EngineOutput, FlightCondition, ModelContext, ModelStack,
};
use nalgebra::DVector;

/// Engine state at the evaluated controls.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EngineState {
    pub throttle: f64,
    pub output: EngineOutput,
    /// Present when the throttle balance ran
    pub status: Option<ThrottleStatus>,
}

/// Everything computed at one trial point.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NodeEvaluation {
    pub alpha: f64,
    pub thrust_req: f64,
    pub aero: AeroForces,
    pub engine: Option<EngineState>,
    pub eom: EomOutput,
}

pub(crate) struct NodeEvaluator<'a> {
    index: usize,
    node: &'a TrajectoryNode,
    options: &'a SolveOptions,
    aircraft: &'a AircraftConfig,
    stack: &'a ModelStack,
    ctx: &'a ModelContext,
    fc: FlightCondition,
    throttle0: f64,
}

impl<'a> NodeEvaluator<'a> {
    /// Resolve the flight condition once; it does not depend on the controls.
    pub(crate) fn new(
        index: usize,
        problem: &'a ControlProblem,
        stack: &'a ModelStack,
        atmosphere: &dyn AtmosphereModel,
        ctx: &'a ModelContext,
        throttle0: f64,
    ) -> SolverResult<Self> {
        let node = &problem.nodes[index];
        let options = &problem.options;
        let atmos = atmosphere
            .properties(node.altitude)
            .map_err(|source| SolverError::Model {
                node: index,
                source,
            })?;
        let fc = compute_flight_condition(
            &node.kinematics(),
            options.speed_type,
            options.ground_roll,
            &atmos,
        )
        .map_err(|e| SolverError::from_dynamics(index, e))?;

        Ok(Self {
            index,
            node,
            options,
            aircraft: &problem.aircraft,
            stack,
            ctx,
            fc,
            throttle0,
        })
    }

    pub(crate) fn condition(&self) -> &FlightCondition {
        &self.fc
    }

    fn ground(&self) -> bool {
        self.options.ground_roll
    }

    /// Pack starting controls into the unknown vector.
    pub(crate) fn unknowns(&self, alpha: f64, thrust_req: f64) -> DVector<f64> {
        if self.ground() {
            DVector::from_element(1, thrust_req)
        } else {
            DVector::from_vec(vec![alpha, thrust_req])
        }
    }

    fn controls(&self, x: &DVector<f64>) -> (f64, f64) {
        if self.ground() {
            (self.node.ground_alpha.value, x[0])
        } else {
            (x[0], x[1])
        }
    }

    /// Aerodynamics, throttle balance (if enabled) and equations of motion.
    pub(crate) fn evaluate(&self, x: &DVector<f64>) -> SolverResult<NodeEvaluation> {
        let (alpha, thrust_req) = self.controls(x);
        let aero = self
            .stack
            .aerodynamics(&self.fc, alpha, self.ctx)
            .map_err(|source| SolverError::Model {
                node: self.index,
                source,
            })?;

        let engine = if self.options.balance_throttle {
            let balanced = balance_throttle(
                thrust_req,
                self.throttle0,
                &self.options.throttle,
                |throttle| self.stack.propulsion(&self.fc, throttle, self.ctx),
            )
            .map_err(|source| SolverError::Throttle {
                node: self.index,
                source,
            })?;
            Some(EngineState {
                throttle: balanced.throttle,
                output: balanced.output,
                status: Some(balanced.status),
            })
        } else {
            None
        };

        // Forces use thrust_req; delivered thrust is only reported
        let eom = evaluate_eom(
            &self.fc,
            self.aircraft,
            self.node.mass.value,
            alpha,
            thrust_req,
            &aero,
        )
        .map_err(|e| SolverError::from_dynamics(self.index, e))?;

        Ok(NodeEvaluation {
            alpha,
            thrust_req,
            aero,
            engine,
            eom,
        })
    }

    pub(crate) fn residual(&self, x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(DVector::from_vec(self.evaluate(x)?.eom.residual.components()))
    }

    /// Final evaluation for reporting: adds the fixed-throttle engine output
    /// when the balance is off and the node carries a throttle.
    pub(crate) fn report(&self, x: &DVector<f64>) -> SolverResult<NodeEvaluation> {
        let mut evaluation = self.evaluate(x)?;
        if evaluation.engine.is_none() && self.stack.has_propulsion() {
            if let Some(throttle) = self.node.throttle {
                let output = self
                    .stack
                    .propulsion(&self.fc, throttle, self.ctx)
                    .map_err(|source| SolverError::Model {
                        node: self.index,
                        source,
                    })?;
                evaluation.engine = Some(EngineState {
                    throttle,
                    output,
                    status: None,
                });
            }
        }
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newton::NewtonConfig;
    use crate::problem::SolveOptions;
    use crate::throttle::ThrottleConfig;
    use fp_core::units::constants::G0_MPS2;
    use fp_core::units::{kg, m, m2, rad};
    use fp_models::{DragPolar, StandardAtmosphere};

    fn problem(ground_roll: bool, dh_dr: f64) -> ControlProblem {
        let options = SolveOptions::new(NewtonConfig::new(20, 1e-8), ThrottleConfig::new(30, 1e-10))
            .with_ground_roll(ground_roll);
        let aircraft = AircraftConfig {
            wing_incidence: rad(0.0),
            rolling_friction: 0.0,
        };
        let node = TrajectoryNode::level(m(0.0), 60.0, kg(20_000.0))
            .with_path(dh_dr, 0.0)
            .with_ground_alpha(rad(0.05));
        ControlProblem::new(options, aircraft).with_nodes([node])
    }

    fn stack() -> ModelStack {
        ModelStack::new().with_aerodynamics(DragPolar::new("wing", m2(60.0), 0.3, 5.0, 0.03, 0.05))
    }

    #[test]
    fn ground_mode_has_a_single_unknown_and_residual() {
        let problem = problem(true, 0.0);
        let stack = stack();
        let ctx = ModelContext::new(1, false);
        let eval =
            NodeEvaluator::new(0, &problem, &stack, &StandardAtmosphere::new(), &ctx, 0.5).unwrap();
        let x = eval.unknowns(0.0, 10_000.0);
        assert_eq!(x.len(), 1);
        assert_eq!(eval.residual(&x).unwrap().len(), 1);
        assert!(eval.condition().gamma_rate.is_none());
        // Ground alpha is taken from the node, not the unknowns
        assert_eq!(eval.evaluate(&x).unwrap().alpha, 0.05);
    }

    #[test]
    fn ground_speed_residual_differs_by_the_climb_term() {
        let dh_dr = 0.08;
        let air = problem(false, dh_dr);
        let ground = problem(true, dh_dr);
        let stack = stack();
        let ctx = ModelContext::new(1, false);
        let atmos = StandardAtmosphere::new();
        let air_eval = NodeEvaluator::new(0, &air, &stack, &atmos, &ctx, 0.5).unwrap();
        let ground_eval = NodeEvaluator::new(0, &ground, &stack, &atmos, &ctx, 0.5).unwrap();

        let thrust = 30_000.0;
        let r_air = air_eval.evaluate(&air_eval.unknowns(0.05, thrust)).unwrap();
        let r_ground = ground_eval
            .evaluate(&ground_eval.unknowns(0.05, thrust))
            .unwrap();
        let gamma = dh_dr.atan();
        let diff = r_air.eom.residual.speed - r_ground.eom.residual.speed;
        assert!((diff - G0_MPS2 * gamma.sin()).abs() < 1e-9);
    }

    #[test]
    fn bad_altitude_is_an_input_domain_error() {
        let mut problem = problem(false, 0.0);
        problem.nodes[0].altitude = m(-50.0);
        let stack = stack();
        let ctx = ModelContext::new(1, false);
        let err = NodeEvaluator::new(0, &problem, &stack, &StandardAtmosphere::new(), &ctx, 0.5)
            .err()
            .unwrap();
        assert!(matches!(err, SolverError::InputDomain { node: 0, .. }));
    }
}
