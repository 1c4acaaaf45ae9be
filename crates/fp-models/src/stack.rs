//! Ordered composition of the force models active in a solve.

use crate::aero::{AeroForces, AerodynamicsModel};
use crate::condition::FlightCondition;
use crate::error::{ModelError, ModelResult};
use crate::propulsion::{EngineOutput, PropulsionModel};
use fp_core::units::{kgps, newtons};
use tracing::debug;

/// Ports the solver knows how to consume from force models.
pub const FORCE_PORTS: [&str; 4] = ["lift", "drag", "thrust", "fuel_flow"];

/// Aerodynamic configuration the models are built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AeroMethod {
    /// Clean wing, no flaps or gear.
    Cruise,
    /// Flaps and gear as scheduled for takeoff/landing.
    LowSpeed,
}

impl AeroMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AeroMethod::Cruise => "cruise",
            AeroMethod::LowSpeed => "low_speed",
        }
    }
}

/// Build-time context handed to every model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelContext {
    pub num_nodes: usize,
    pub method: AeroMethod,
    /// Whether aerodynamics may report alpha instead of reading it.
    pub output_alpha: bool,
}

impl ModelContext {
    /// Context for a solve; `clean` selects cruise aerodynamics.
    ///
    /// Alpha is always owned by the balance here, so `output_alpha` starts false.
    pub fn new(num_nodes: usize, clean: bool) -> Self {
        let method = if clean {
            AeroMethod::Cruise
        } else {
            AeroMethod::LowSpeed
        };
        Self {
            num_nodes,
            method,
            output_alpha: false,
        }
    }
}

/// One entry of the model stack.
pub enum SubsystemModel {
    Aerodynamics(Box<dyn AerodynamicsModel>),
    Propulsion(Box<dyn PropulsionModel>),
}

impl SubsystemModel {
    pub fn name(&self) -> &str {
        match self {
            SubsystemModel::Aerodynamics(m) => m.name(),
            SubsystemModel::Propulsion(m) => m.name(),
        }
    }

    fn ports(&self, ctx: &ModelContext) -> (Vec<&'static str>, Vec<&'static str>) {
        match self {
            SubsystemModel::Aerodynamics(m) => (m.mission_inputs(ctx), m.mission_outputs(ctx)),
            SubsystemModel::Propulsion(m) => (m.mission_inputs(ctx), m.mission_outputs(ctx)),
        }
    }
}

/// Caller-ordered list of active force models.
///
/// Contributions are summed: lift and drag over every aerodynamics entry,
/// thrust and fuel flow over every propulsion entry.
#[derive(Default)]
pub struct ModelStack {
    models: Vec<SubsystemModel>,
}

impl ModelStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, model: SubsystemModel) {
        self.models.push(model);
    }

    pub fn with_aerodynamics(mut self, model: impl AerodynamicsModel + 'static) -> Self {
        self.push(SubsystemModel::Aerodynamics(Box::new(model)));
        self
    }

    pub fn with_propulsion(mut self, model: impl PropulsionModel + 'static) -> Self {
        self.push(SubsystemModel::Propulsion(Box::new(model)));
        self
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(SubsystemModel::name).collect()
    }

    pub fn has_propulsion(&self) -> bool {
        self.models
            .iter()
            .any(|m| matches!(m, SubsystemModel::Propulsion(_)))
    }

    /// Check stack composition and port lists for the given context.
    pub fn validate(&self, ctx: &ModelContext) -> ModelResult<()> {
        if !self
            .models
            .iter()
            .any(|m| matches!(m, SubsystemModel::Aerodynamics(_)))
        {
            return Err(ModelError::InvalidStack {
                what: "at least one aerodynamics model is required",
            });
        }

        for model in &self.models {
            let (inputs, outputs) = model.ports(ctx);
            debug!(
                model = model.name(),
                method = ctx.method.as_str(),
                ?inputs,
                ?outputs,
                "model ports"
            );
            for port in outputs {
                if port == "alpha" {
                    return Err(ModelError::InvalidPort {
                        model: model.name().to_string(),
                        port: port.to_string(),
                        reason: "alpha is solved by the balance",
                    });
                }
                if !FORCE_PORTS.contains(&port) {
                    return Err(ModelError::InvalidPort {
                        model: model.name().to_string(),
                        port: port.to_string(),
                        reason: "not a force port",
                    });
                }
            }
        }
        Ok(())
    }

    /// Summed lift and drag at `alpha`.
    pub fn aerodynamics(
        &self,
        fc: &FlightCondition,
        alpha: f64,
        ctx: &ModelContext,
    ) -> ModelResult<AeroForces> {
        let mut lift = 0.0;
        let mut drag = 0.0;
        for model in &self.models {
            if let SubsystemModel::Aerodynamics(m) = model {
                let f = m.evaluate(fc, alpha, ctx)?;
                lift += f.lift.value;
                drag += f.drag.value;
            }
        }
        Ok(AeroForces {
            lift: newtons(lift),
            drag: newtons(drag),
        })
    }

    /// Summed thrust and fuel flow at `throttle`.
    pub fn propulsion(
        &self,
        fc: &FlightCondition,
        throttle: f64,
        ctx: &ModelContext,
    ) -> ModelResult<EngineOutput> {
        let mut thrust = 0.0;
        let mut fuel_flow = 0.0;
        for model in &self.models {
            if let SubsystemModel::Propulsion(m) = model {
                let out = m.evaluate(fc, throttle, ctx)?;
                thrust += out.thrust.value;
                fuel_flow += out.fuel_flow.value;
            }
        }
        Ok(EngineOutput {
            thrust: newtons(thrust),
            fuel_flow: kgps(fuel_flow),
        })
    }
}
