//! Propulsion capability and a throttle-scaled reference engine deck.

use crate::condition::FlightCondition;
use crate::error::{ModelError, ModelResult};
use crate::stack::ModelContext;
use fp_core::numeric::ensure_finite;
use fp_core::units::constants::RHO_SL;
use fp_core::units::{Force, MassRate, kgps, newtons};

/// Net thrust and fuel flow contributed by one propulsion model.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineOutput {
    pub thrust: Force,
    /// Fuel consumption, positive while burning fuel
    pub fuel_flow: MassRate,
}

impl EngineOutput {
    pub fn zero() -> Self {
        Self {
            thrust: newtons(0.0),
            fuel_flow: kgps(0.0),
        }
    }
}

/// Trait for propulsion models.
///
/// Thrust must be a continuous function of throttle for the throttle balance
/// to converge; it does not need to be linear.
pub trait PropulsionModel: Send + Sync {
    /// Model name for logging and port diagnostics.
    fn name(&self) -> &str;

    /// Names of the quantities this model reads in the given context.
    fn mission_inputs(&self, ctx: &ModelContext) -> Vec<&'static str>;

    /// Names of the quantities this model produces in the given context.
    fn mission_outputs(&self, ctx: &ModelContext) -> Vec<&'static str>;

    /// Thrust and fuel flow at `throttle` (0 = idle, 1 = max).
    fn evaluate(
        &self,
        fc: &FlightCondition,
        throttle: f64,
        ctx: &ModelContext,
    ) -> ModelResult<EngineOutput>;
}

/// Engine deck scaled from sea-level static thrust.
///
/// `T = n * throttle * T_sls * sigma^x * (1 - k_M * M)` with density ratio
/// `sigma`, and `fuel_flow = tsfc * T`.
#[derive(Clone, Debug)]
pub struct ScaledEngine {
    name: String,
    engine_count: usize,
    sls_thrust: Force,
    /// Thrust-specific fuel consumption [kg/s per N]
    tsfc: f64,
    density_exponent: f64,
    mach_lapse: f64,
}

impl ScaledEngine {
    pub fn new(
        name: impl Into<String>,
        engine_count: usize,
        sls_thrust: Force,
        tsfc: f64,
    ) -> Self {
        Self {
            name: name.into(),
            engine_count,
            sls_thrust,
            tsfc,
            density_exponent: 0.7,
            mach_lapse: 0.4,
        }
    }

    pub fn with_lapse(mut self, density_exponent: f64, mach_lapse: f64) -> Self {
        self.density_exponent = density_exponent;
        self.mach_lapse = mach_lapse;
        self
    }

    /// Installed thrust at full throttle [N].
    pub fn max_thrust(&self, fc: &FlightCondition) -> f64 {
        let sigma = fc.density.value / RHO_SL;
        let mach_factor = (1.0 - self.mach_lapse * fc.mach).max(0.0);
        self.engine_count as f64
            * self.sls_thrust.value
            * sigma.powf(self.density_exponent)
            * mach_factor
    }
}

impl PropulsionModel for ScaledEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn mission_inputs(&self, _ctx: &ModelContext) -> Vec<&'static str> {
        vec!["mach", "density", "throttle"]
    }

    fn mission_outputs(&self, _ctx: &ModelContext) -> Vec<&'static str> {
        vec!["thrust", "fuel_flow"]
    }

    fn evaluate(
        &self,
        fc: &FlightCondition,
        throttle: f64,
        _ctx: &ModelContext,
    ) -> ModelResult<EngineOutput> {
        let throttle = ensure_finite(throttle, "throttle")?;
        if fc.density.value <= 0.0 {
            return Err(ModelError::NonPhysical { what: "density" });
        }
        let thrust = throttle * self.max_thrust(fc);
        let fuel_flow = ensure_finite(self.tsfc * thrust.abs(), "fuel flow")?;
        Ok(EngineOutput {
            thrust: newtons(thrust),
            fuel_flow: kgps(fuel_flow),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ScaledEngine {
        ScaledEngine::new("engines", 2, newtons(100_000.0), 1.5e-5)
    }

    #[test]
    fn thrust_is_linear_in_throttle() {
        let fc = FlightCondition::sea_level(100.0);
        let ctx = ModelContext::new(1, false);
        let e = engine();
        let half = e.evaluate(&fc, 0.5, &ctx).unwrap();
        let full = e.evaluate(&fc, 1.0, &ctx).unwrap();
        assert!((2.0 * half.thrust.value - full.thrust.value).abs() < 1e-6);
        assert!((full.thrust.value - e.max_thrust(&fc)).abs() < 1e-6);
        assert!((full.fuel_flow.value - 1.5e-5 * full.thrust.value).abs() < 1e-12);
    }

    #[test]
    fn max_thrust_lapses_with_mach() {
        let e = engine();
        let slow = e.max_thrust(&FlightCondition::sea_level(50.0));
        let fast = e.max_thrust(&FlightCondition::sea_level(200.0));
        assert!(fast < slow);
        assert!(slow < 200_000.0);
    }

    #[test]
    fn nan_throttle_is_rejected() {
        let fc = FlightCondition::sea_level(100.0);
        let ctx = ModelContext::new(1, false);
        assert!(engine().evaluate(&fc, f64::NAN, &ctx).is_err());
    }
}
