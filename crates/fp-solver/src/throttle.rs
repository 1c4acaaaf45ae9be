//! Nested throttle balance.
//!
//! Finds the throttle in [0, 1] whose delivered thrust matches the thrust the
//! outer balance currently requires. The residual is normalised by the
//! required thrust so the tolerance is relative:
//!
//! ```text
//! r(throttle) = (T(throttle) - T_req) / max(|T_req|, 1 N)
//! ```
//!
//! When the root lies outside [0, 1] the iterate pins at the bound and the
//! result is reported as saturated instead of failing.

use crate::error::{SolverError, SolverResult, ThrottleError};
use fp_models::{EngineOutput, ModelResult};
use tracing::trace;

/// Inner solver configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ThrottleConfig {
    pub max_iterations: usize,
    /// Tolerance on the normalised thrust residual
    pub tol: f64,
    /// Absolute throttle step for the derivative
    pub fd_step: f64,
}

impl ThrottleConfig {
    pub fn new(max_iterations: usize, tol: f64) -> Self {
        Self {
            max_iterations,
            tol,
            fd_step: 1e-6,
        }
    }

    pub fn with_fd_step(mut self, fd_step: f64) -> Self {
        self.fd_step = fd_step;
        self
    }

    pub fn validate(&self) -> SolverResult<()> {
        let what = if self.max_iterations == 0 {
            "max_iterations must be positive"
        } else if !(self.tol.is_finite() && self.tol > 0.0) {
            "tol must be positive and finite"
        } else if !(self.fd_step > 0.0 && self.fd_step < 0.5) {
            "fd_step must lie in (0, 0.5)"
        } else {
            return Ok(());
        };
        Err(SolverError::ProblemSetup {
            what: format!("throttle configuration: {what}"),
        })
    }
}

/// Throttle limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottleBound {
    Idle,
    Max,
}

impl ThrottleBound {
    pub fn value(&self) -> f64 {
        match self {
            ThrottleBound::Idle => 0.0,
            ThrottleBound::Max => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottleBound::Idle => "idle",
            ThrottleBound::Max => "max",
        }
    }
}

/// Outcome of the throttle balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottleStatus {
    /// Delivered thrust matches the requirement within tolerance.
    Balanced,
    /// The requirement is out of reach; throttle pinned at `bound`.
    Saturated { bound: ThrottleBound },
}

impl ThrottleStatus {
    pub fn is_saturated(&self) -> bool {
        matches!(self, ThrottleStatus::Saturated { .. })
    }
}

/// Throttle and engine output at the end of the balance.
#[derive(Clone, Debug, PartialEq)]
pub struct ThrottleSolution {
    pub throttle: f64,
    pub output: EngineOutput,
    pub status: ThrottleStatus,
    /// Normalised thrust residual at `throttle`
    pub residual: f64,
    pub iterations: usize,
}

/// Balance `deliver(throttle)` against `thrust_req`, starting from `throttle0`.
pub fn balance_throttle<F>(
    thrust_req: f64,
    throttle0: f64,
    config: &ThrottleConfig,
    deliver: F,
) -> Result<ThrottleSolution, ThrottleError>
where
    F: Fn(f64) -> ModelResult<EngineOutput>,
{
    let scale = thrust_req.abs().max(1.0);
    let residual_at = |output: &EngineOutput| (output.thrust.value - thrust_req) / scale;

    let mut throttle = throttle0.clamp(0.0, 1.0);
    let mut output = deliver(throttle)?;
    let mut r = residual_at(&output);

    for iter in 0..config.max_iterations {
        if r.abs() <= config.tol {
            return Ok(ThrottleSolution {
                throttle,
                output,
                status: ThrottleStatus::Balanced,
                residual: r,
                iterations: iter,
            });
        }

        // Perturb towards the interior so the probe stays within [0, 1]
        let probe = if throttle + config.fd_step <= 1.0 {
            throttle + config.fd_step
        } else {
            throttle - config.fd_step
        };
        let slope = (residual_at(&deliver(probe)?) - r) / (probe - throttle);
        if !slope.is_finite() || slope.abs() < f64::EPSILON {
            return Err(ThrottleError::Singular { throttle });
        }

        let next = (throttle - r / slope).clamp(0.0, 1.0);
        trace!(iteration = iter, throttle, next, residual = r, "throttle update");
        if next == throttle {
            let bound = if throttle >= ThrottleBound::Max.value() {
                ThrottleBound::Max
            } else if throttle <= ThrottleBound::Idle.value() {
                ThrottleBound::Idle
            } else {
                // Stalled inside the range without meeting the tolerance
                break;
            };
            return Ok(ThrottleSolution {
                throttle,
                output,
                status: ThrottleStatus::Saturated { bound },
                residual: r,
                iterations: iter,
            });
        }

        throttle = next;
        output = deliver(throttle)?;
        r = residual_at(&output);
    }

    if r.abs() <= config.tol {
        return Ok(ThrottleSolution {
            throttle,
            output,
            status: ThrottleStatus::Balanced,
            residual: r,
            iterations: config.max_iterations,
        });
    }

    Err(ThrottleError::NonConvergence {
        iterations: config.max_iterations,
        residual: r,
    })
}
