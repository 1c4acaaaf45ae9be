//! High-level solver interface.

use crate::error::{SolverError, SolverResult};
use crate::initialization::NodeStart;
use crate::jacobian::jacobian;
use crate::newton::newton_solve;
use crate::node::NodeEvaluator;
use crate::problem::ControlProblem;
use crate::solution::{ControlSolution, NodeSolution};
use fp_dynamics::mass_rate;
use fp_models::{AtmosphereModel, ModelContext, ModelStack};
use nalgebra::DVector;
use rayon::prelude::*;
use tracing::{info, warn};

/// Solve the control inversion for every node.
///
/// This function:
/// 1. Validates the problem, the model stack and the warm start
/// 2. Derives each node's flight condition from its prescribed kinematics
/// 3. Runs a Newton balance per node (in parallel) for alpha and thrust_req,
///    with the throttle balance nested in every residual evaluation when enabled
/// 4. Derives mass rate and reporting outputs from the converged controls
///
/// Any node failure aborts the solve with the error of the lowest failing
/// node index. Throttle saturation does not; it is reported in the node's
/// `throttle_status`.
///
/// # Arguments
/// * `problem` - Options, airframe and nodes
/// * `stack` - Active aerodynamics and propulsion models
/// * `atmosphere` - Atmosphere the flight conditions are derived from
/// * `warm_start` - Previous solution for the same nodes, used as the initial guess
pub fn solve(
    problem: &ControlProblem,
    stack: &ModelStack,
    atmosphere: &dyn AtmosphereModel,
    warm_start: Option<&ControlSolution>,
) -> SolverResult<ControlSolution> {
    problem.validate()?;

    let options = &problem.options;
    let ctx = ModelContext::new(problem.num_nodes(), options.clean);
    stack.validate(&ctx)?;

    if options.balance_throttle && !stack.has_propulsion() {
        return Err(SolverError::ProblemSetup {
            what: "throttle balance needs at least one propulsion model".to_string(),
        });
    }
    if let Some(prev) = warm_start {
        if prev.len() != problem.num_nodes() {
            return Err(SolverError::ProblemSetup {
                what: format!(
                    "warm start has {} nodes, problem has {}",
                    prev.len(),
                    problem.num_nodes()
                ),
            });
        }
    }

    // Results stay in node order so a failure always reports the lowest failing node
    let results: Vec<SolverResult<NodeSolution>> = (0..problem.num_nodes())
        .into_par_iter()
        .map(|i| {
            let warm = warm_start.map(|prev| &prev.nodes[i]);
            solve_node(i, problem, stack, atmosphere, &ctx, warm)
        })
        .collect();
    let nodes = results.into_iter().collect::<SolverResult<Vec<_>>>()?;

    let solution = ControlSolution::from_nodes(nodes);
    for (node, bound) in solution.saturated_nodes() {
        warn!(node, bound = bound.as_str(), "throttle saturated, trajectory infeasible");
    }
    info!(
        nodes = solution.len(),
        unknowns_per_node = problem.unknowns_per_node(),
        speed_type = options.speed_type.as_str(),
        total_iterations = solution.total_iterations,
        max_residual = solution.max_residual,
        warm_start = warm_start.is_some(),
        "control solve converged"
    );
    Ok(solution)
}

fn solve_node(
    index: usize,
    problem: &ControlProblem,
    stack: &ModelStack,
    atmosphere: &dyn AtmosphereModel,
    ctx: &ModelContext,
    warm: Option<&NodeSolution>,
) -> SolverResult<NodeSolution> {
    let options = &problem.options;
    let start = NodeStart::new(&options.initial_guess, warm);
    let evaluator = NodeEvaluator::new(index, problem, stack, atmosphere, ctx, start.throttle)?;

    let config = &options.newton;
    let residual = |x: &DVector<f64>| evaluator.residual(x);
    let result = newton_solve(
        index,
        evaluator.unknowns(start.alpha, start.thrust_req),
        residual,
        |x, r| jacobian(config.jacobian, x, r, residual, config.fd_step),
        config,
    )?;

    let evaluation = evaluator.report(&result.x)?;
    let fc = evaluator.condition();
    // No engine evaluated (no balance, no fixed throttle): burn is unknown, not zero
    let (fuel_flow, dmass_dr) = match evaluation.engine.as_ref() {
        Some(engine) => {
            let fuel_flow = engine.output.fuel_flow;
            let dmass_dr = mass_rate(fuel_flow, fc.dt_dr)
                .map_err(|e| SolverError::from_dynamics(index, e))?;
            (Some(fuel_flow), Some(dmass_dr))
        }
        None => (None, None),
    };

    Ok(NodeSolution::new(fc, evaluation, &result, fuel_flow, dmass_dr))
}
