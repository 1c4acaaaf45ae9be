//! Damped Newton iteration for the per-node balance.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

/// Ratio of smallest to largest pivot below which the Jacobian is treated as singular.
const SINGULAR_PIVOT_RATIO: f64 = 1e-14;

/// Step control applied to each Newton update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineSearch {
    /// Always take the full Newton step.
    FullStep,
    /// Halve (or scale by `beta`) until the residual norm decreases.
    Backtracking { beta: f64, max_steps: usize },
}

/// Finite-difference scheme for the Jacobian.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JacobianScheme {
    #[default]
    Forward,
    Central,
}

/// Newton solver configuration. Iteration budget and tolerance have no
/// default and are always chosen by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance on the residual max-norm
    pub abs_tol: f64,
    /// Relative tolerance on the residual max-norm, against the initial residual
    pub rel_tol: f64,
    pub line_search: LineSearch,
    pub jacobian: JacobianScheme,
    /// Relative finite-difference step
    pub fd_step: f64,
}

impl NewtonConfig {
    /// Full-step Newton with forward differences; `tol` is used as the
    /// absolute tolerance and the relative test is disabled.
    pub fn new(max_iterations: usize, tol: f64) -> Self {
        Self {
            max_iterations,
            abs_tol: tol,
            rel_tol: 0.0,
            line_search: LineSearch::FullStep,
            jacobian: JacobianScheme::Forward,
            fd_step: 1e-7,
        }
    }

    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self
    }

    pub fn with_line_search(mut self, line_search: LineSearch) -> Self {
        self.line_search = line_search;
        self
    }

    pub fn with_jacobian(mut self, scheme: JacobianScheme) -> Self {
        self.jacobian = scheme;
        self
    }

    pub fn with_fd_step(mut self, fd_step: f64) -> Self {
        self.fd_step = fd_step;
        self
    }

    /// Check that the configuration can drive an iteration at all.
    pub fn validate(&self) -> SolverResult<()> {
        if self.max_iterations == 0 {
            return Err(setup("max_iterations must be positive"));
        }
        if !(self.abs_tol.is_finite() && self.abs_tol > 0.0) {
            return Err(setup("abs_tol must be positive and finite"));
        }
        if !(self.rel_tol.is_finite() && self.rel_tol >= 0.0) {
            return Err(setup("rel_tol must be non-negative and finite"));
        }
        if !(self.fd_step.is_finite() && self.fd_step > 0.0) {
            return Err(setup("fd_step must be positive and finite"));
        }
        if let LineSearch::Backtracking { beta, max_steps } = self.line_search {
            if !(beta > 0.0 && beta < 1.0) || max_steps == 0 {
                return Err(setup("backtracking needs 0 < beta < 1 and max_steps > 0"));
            }
        }
        Ok(())
    }

    fn converged(&self, r_norm: f64, r0_norm: f64) -> bool {
        r_norm <= self.abs_tol || r_norm <= self.rel_tol * r0_norm
    }
}

fn setup(what: &str) -> SolverError {
    SolverError::ProblemSetup {
        what: format!("Newton configuration: {what}"),
    }
}

/// Newton iteration result.
#[derive(Clone, Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual max-norm
    pub residual_norm: f64,
    /// Number of Newton updates taken
    pub iterations: usize,
}

/// Newton solver with optional backtracking.
///
/// `jacobian_fn` receives the current point and its residual. `node` only
/// labels errors and log records. A starting point that already satisfies
/// the tolerance is returned unchanged with zero iterations.
pub fn newton_solve<F, J>(
    node: usize,
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>, &DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.amax();
    let r0_norm = r_norm;

    for iter in 0..config.max_iterations {
        if config.converged(r_norm, r0_norm) {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
            });
        }

        let jac = jacobian_fn(&x, &r)?;
        let dx = solve_linear(&jac, &r).ok_or(SolverError::SingularJacobian {
            node,
            iteration: iter,
        })?;

        let mut step = 1.0;
        let mut x_new = &x + &dx;
        let mut r_new = residual_fn(&x_new)?;
        let mut r_new_norm = r_new.amax();

        if let LineSearch::Backtracking { beta, max_steps } = config.line_search {
            for _ in 0..max_steps {
                if r_new_norm < r_norm {
                    break;
                }
                step *= beta;
                x_new = &x + step * &dx;
                r_new = residual_fn(&x_new)?;
                r_new_norm = r_new.amax();
                trace!(node, iteration = iter, step, residual = r_new_norm, "backtrack");
            }
        }

        debug!(
            node,
            iteration = iter,
            residual = r_new_norm,
            step,
            "newton update"
        );

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;

        if !r_norm.is_finite() || step < 1e-10 {
            return Err(SolverError::NonConvergence {
                node,
                iterations: iter + 1,
                residual: r_norm,
            });
        }
    }

    if config.converged(r_norm, r0_norm) {
        return Ok(NewtonResult {
            x,
            residual_norm: r_norm,
            iterations: config.max_iterations,
        });
    }

    Err(SolverError::NonConvergence {
        node,
        iterations: config.max_iterations,
        residual: r_norm,
    })
}

/// Solve `J dx = -r`, or `None` when `J` is singular to working precision.
fn solve_linear(jac: &DMatrix<f64>, r: &DVector<f64>) -> Option<DVector<f64>> {
    if jac.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let lu = jac.clone().lu();
    let pivots = lu.u().diagonal();
    let largest = pivots.amax();
    let smallest = pivots.iter().fold(f64::INFINITY, |acc, p| acc.min(p.abs()));
    if largest == 0.0 || smallest <= SINGULAR_PIVOT_RATIO * largest {
        return None;
    }
    let dx = lu.solve(&(-r.clone()))?;
    dx.iter().all(|v| v.is_finite()).then_some(dx)
}
