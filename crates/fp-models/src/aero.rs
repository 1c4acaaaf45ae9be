//! Aerodynamics capability and a parabolic drag-polar reference model.

use crate::condition::FlightCondition;
use crate::error::ModelResult;
use crate::stack::{AeroMethod, ModelContext};
use fp_core::numeric::ensure_finite;
use fp_core::units::{Area, Force, newtons};

/// Lift and drag contributed by one aerodynamics model.
#[derive(Clone, Debug, PartialEq)]
pub struct AeroForces {
    pub lift: Force,
    pub drag: Force,
}

/// Trait for aerodynamics models.
///
/// Implementations are pure functions of the flight condition and angle of
/// attack and must be thread-safe, since nodes are evaluated in parallel.
pub trait AerodynamicsModel: Send + Sync {
    /// Model name for logging and port diagnostics.
    fn name(&self) -> &str;

    /// Names of the quantities this model reads in the given context.
    fn mission_inputs(&self, ctx: &ModelContext) -> Vec<&'static str>;

    /// Names of the quantities this model produces in the given context.
    fn mission_outputs(&self, ctx: &ModelContext) -> Vec<&'static str>;

    /// Lift and drag at `alpha` [rad].
    fn evaluate(
        &self,
        fc: &FlightCondition,
        alpha: f64,
        ctx: &ModelContext,
    ) -> ModelResult<AeroForces>;
}

/// Linear lift curve with a parabolic drag polar.
///
/// `CL = CL0 + CLa * alpha`, `CD = CD0 + K * CL^2`. In low-speed mode the
/// high-lift increments are added to CL0 and CD0; in cruise mode a
/// Lock-style drag rise `20 (M - Mcrit)^4` is applied above the critical Mach.
#[derive(Clone, Debug)]
pub struct DragPolar {
    name: String,
    wing_area: Area,
    cl0: f64,
    cl_alpha: f64,
    cd0: f64,
    induced_factor: f64,
    high_lift_cl: f64,
    high_lift_cd: f64,
    critical_mach: Option<f64>,
}

impl DragPolar {
    pub fn new(
        name: impl Into<String>,
        wing_area: Area,
        cl0: f64,
        cl_alpha: f64,
        cd0: f64,
        induced_factor: f64,
    ) -> Self {
        Self {
            name: name.into(),
            wing_area,
            cl0,
            cl_alpha,
            cd0,
            induced_factor,
            high_lift_cl: 0.0,
            high_lift_cd: 0.0,
            critical_mach: None,
        }
    }

    /// Flap/gear increments used in low-speed mode.
    pub fn with_high_lift(mut self, delta_cl: f64, delta_cd: f64) -> Self {
        self.high_lift_cl = delta_cl;
        self.high_lift_cd = delta_cd;
        self
    }

    /// Enable compressibility drag rise in cruise mode.
    pub fn with_drag_rise(mut self, critical_mach: f64) -> Self {
        self.critical_mach = Some(critical_mach);
        self
    }

    /// Lift and drag coefficients at `alpha` for the given mode and Mach.
    pub fn coefficients(&self, alpha: f64, mach: f64, method: AeroMethod) -> (f64, f64) {
        let (cl0, cd0) = match method {
            AeroMethod::LowSpeed => (self.cl0 + self.high_lift_cl, self.cd0 + self.high_lift_cd),
            AeroMethod::Cruise => (self.cl0, self.cd0),
        };
        let cl = cl0 + self.cl_alpha * alpha;
        let mut cd = cd0 + self.induced_factor * cl * cl;
        if let (AeroMethod::Cruise, Some(m_crit)) = (method, self.critical_mach) {
            if mach > m_crit {
                cd += 20.0 * (mach - m_crit).powi(4);
            }
        }
        (cl, cd)
    }
}

impl AerodynamicsModel for DragPolar {
    fn name(&self) -> &str {
        &self.name
    }

    fn mission_inputs(&self, ctx: &ModelContext) -> Vec<&'static str> {
        let mut ports = vec!["mach", "dynamic_pressure"];
        if !ctx.output_alpha {
            ports.push("alpha");
        }
        ports
    }

    fn mission_outputs(&self, ctx: &ModelContext) -> Vec<&'static str> {
        let mut ports = vec!["lift", "drag"];
        if ctx.output_alpha {
            ports.push("alpha");
        }
        ports
    }

    fn evaluate(
        &self,
        fc: &FlightCondition,
        alpha: f64,
        ctx: &ModelContext,
    ) -> ModelResult<AeroForces> {
        let (cl, cd) = self.coefficients(alpha, fc.mach, ctx.method);
        let qs = fc.dynamic_pressure.value * self.wing_area.value;
        let lift = ensure_finite(qs * cl, "lift")?;
        let drag = ensure_finite(qs * cd, "drag")?;
        Ok(AeroForces {
            lift: newtons(lift),
            drag: newtons(drag),
        })
    }
}
