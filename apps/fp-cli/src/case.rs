//! Case file schema.
//!
//! A case bundles solve options, the airframe, the reference force models
//! and the node vector. Quantities are SI with the unit in the field name;
//! angles are in degrees.

use crate::error::{CliError, CliResult};
use fp_core::units::{deg, ft, kg, knots, m, m2, newtons};
use fp_dynamics::{AircraftConfig, SpeedType};
use fp_models::{DragPolar, ModelContext, ModelStack, ScaledEngine};
use fp_solver::{
    ControlProblem, InitialGuess, JacobianScheme, LineSearch, NewtonConfig, SolveOptions,
    ThrottleConfig, TrajectoryNode,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Case {
    pub name: String,
    pub options: OptionsDef,
    #[serde(default)]
    pub aircraft: AircraftDef,
    pub aerodynamics: Vec<DragPolarDef>,
    #[serde(default)]
    pub propulsion: Vec<EngineDef>,
    pub nodes: Vec<NodeDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTypeDef {
    #[default]
    Tas,
    Eas,
    Mach,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionsDef {
    #[serde(default)]
    pub speed_type: SpeedTypeDef,
    #[serde(default)]
    pub ground_roll: bool,
    #[serde(default)]
    pub clean: bool,
    #[serde(default)]
    pub balance_throttle: bool,
    pub newton: NewtonDef,
    pub throttle: ThrottleDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_guess: Option<InitialGuessDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewtonDef {
    pub max_iterations: usize,
    pub tolerance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_tolerance: Option<f64>,
    #[serde(default)]
    pub line_search: LineSearchDef,
    #[serde(default)]
    pub central_differences: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fd_step: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineSearchDef {
    #[default]
    FullStep,
    Backtracking { beta: f64, max_steps: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThrottleDef {
    pub max_iterations: usize,
    pub tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitialGuessDef {
    pub alpha_deg: f64,
    pub thrust_n: f64,
    pub throttle: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AircraftDef {
    #[serde(default)]
    pub wing_incidence_deg: f64,
    #[serde(default)]
    pub rolling_friction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DragPolarDef {
    pub name: String,
    pub wing_area_m2: f64,
    pub cl0: f64,
    pub cl_alpha: f64,
    pub cd0: f64,
    pub induced_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_lift: Option<HighLiftDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_mach: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HighLiftDef {
    pub delta_cl: f64,
    pub delta_cd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineDef {
    pub name: String,
    pub engine_count: usize,
    pub sls_thrust_n: f64,
    /// kg/s per N
    pub tsfc: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lapse: Option<LapseDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LapseDef {
    pub density_exponent: f64,
    pub mach_lapse: f64,
}

/// One trajectory node. Altitude and airspeed default to 10 000 ft and
/// 250 kn; slopes and rates default to zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    #[serde(default = "default_altitude_m")]
    pub altitude_m: f64,
    /// m/s for TAS/EAS, Mach number for Mach
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub speed_rate: f64,
    #[serde(default)]
    pub dh_dr: f64,
    #[serde(default)]
    pub d2h_dr2: f64,
    pub mass_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle: Option<f64>,
    #[serde(default)]
    pub ground_alpha_deg: f64,
}

fn default_altitude_m() -> f64 {
    ft(10_000.0).value
}

/// 250 kn in m/s; a Mach case must give its speed explicitly.
fn default_speed() -> f64 {
    knots(250.0).value
}

pub fn load_case(path: &Path) -> CliResult<Case> {
    let content = std::fs::read_to_string(path)?;
    parse_case(&content)
}

pub fn parse_case(content: &str) -> CliResult<Case> {
    let case: Case = serde_yaml::from_str(content)?;
    case.validate()?;
    Ok(case)
}

impl Case {
    /// Structural checks the library cannot make: model parameters.
    pub fn validate(&self) -> CliResult<()> {
        if self.aerodynamics.is_empty() {
            return Err(case_error("at least one aerodynamics entry is required"));
        }
        for a in &self.aerodynamics {
            if !(a.wing_area_m2 > 0.0) {
                return Err(case_error(format!("{}: wing area must be positive", a.name)));
            }
        }
        for e in &self.propulsion {
            if e.engine_count == 0 || !(e.sls_thrust_n > 0.0) || !(e.tsfc >= 0.0) {
                return Err(case_error(format!(
                    "{}: engine count and thrust must be positive, tsfc non-negative",
                    e.name
                )));
            }
        }
        Ok(())
    }

    pub fn model_stack(&self) -> ModelStack {
        let mut stack = ModelStack::new();
        for a in &self.aerodynamics {
            let mut polar = DragPolar::new(
                a.name.clone(),
                m2(a.wing_area_m2),
                a.cl0,
                a.cl_alpha,
                a.cd0,
                a.induced_factor,
            );
            if let Some(hl) = &a.high_lift {
                polar = polar.with_high_lift(hl.delta_cl, hl.delta_cd);
            }
            if let Some(m_crit) = a.critical_mach {
                polar = polar.with_drag_rise(m_crit);
            }
            stack = stack.with_aerodynamics(polar);
        }
        for e in &self.propulsion {
            let mut engine = ScaledEngine::new(
                e.name.clone(),
                e.engine_count,
                newtons(e.sls_thrust_n),
                e.tsfc,
            );
            if let Some(lapse) = &e.lapse {
                engine = engine.with_lapse(lapse.density_exponent, lapse.mach_lapse);
            }
            stack = stack.with_propulsion(engine);
        }
        stack
    }

    pub fn model_context(&self) -> ModelContext {
        ModelContext::new(self.nodes.len(), self.options.clean)
    }

    pub fn problem(&self) -> ControlProblem {
        ControlProblem::new(self.options.to_solve_options(), self.aircraft.to_config())
            .with_nodes(self.nodes.iter().map(NodeDef::to_node))
    }
}

impl OptionsDef {
    fn to_solve_options(&self) -> SolveOptions {
        let speed_type = match self.speed_type {
            SpeedTypeDef::Tas => SpeedType::Tas,
            SpeedTypeDef::Eas => SpeedType::Eas,
            SpeedTypeDef::Mach => SpeedType::Mach,
        };
        let mut options = SolveOptions::new(
            self.newton.to_config(),
            ThrottleConfig::new(self.throttle.max_iterations, self.throttle.tolerance),
        )
        .with_speed_type(speed_type)
        .with_ground_roll(self.ground_roll)
        .with_clean(self.clean)
        .with_throttle_balance(self.balance_throttle);
        if let Some(g) = &self.initial_guess {
            options = options.with_initial_guess(InitialGuess {
                alpha: deg(g.alpha_deg),
                thrust_req: newtons(g.thrust_n),
                throttle: g.throttle,
            });
        }
        options
    }
}

impl NewtonDef {
    fn to_config(&self) -> NewtonConfig {
        let line_search = match self.line_search {
            LineSearchDef::FullStep => LineSearch::FullStep,
            LineSearchDef::Backtracking { beta, max_steps } => {
                LineSearch::Backtracking { beta, max_steps }
            }
        };
        let scheme = if self.central_differences {
            JacobianScheme::Central
        } else {
            JacobianScheme::Forward
        };
        let mut config = NewtonConfig::new(self.max_iterations, self.tolerance)
            .with_line_search(line_search)
            .with_jacobian(scheme);
        if let Some(rel) = self.rel_tolerance {
            config = config.with_rel_tol(rel);
        }
        if let Some(step) = self.fd_step {
            config = config.with_fd_step(step);
        }
        config
    }
}

impl AircraftDef {
    fn to_config(&self) -> AircraftConfig {
        AircraftConfig {
            wing_incidence: deg(self.wing_incidence_deg),
            rolling_friction: self.rolling_friction,
        }
    }
}

impl NodeDef {
    fn to_node(&self) -> TrajectoryNode {
        let mut node = TrajectoryNode::level(m(self.altitude_m), self.speed, kg(self.mass_kg))
            .with_path(self.dh_dr, self.d2h_dr2)
            .with_speed_rate(self.speed_rate)
            .with_ground_alpha(deg(self.ground_alpha_deg));
        if let Some(t) = self.throttle {
            node = node.with_throttle(t);
        }
        node
    }
}

fn case_error(what: impl Into<String>) -> CliError {
    CliError::Case { what: what.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRUISE: &str = include_str!("../cases/cruise.yaml");
    const TAKEOFF: &str = include_str!("../cases/takeoff_roll.yaml");

    #[test]
    fn parse_cruise_case() {
        let case = parse_case(CRUISE).unwrap();
        assert_eq!(case.options.speed_type, SpeedTypeDef::Tas);
        assert!(case.options.clean);
        assert!(case.options.balance_throttle);
        assert_eq!(case.aerodynamics.len(), 1);
        assert_eq!(case.propulsion.len(), 1);

        let problem = case.problem();
        assert_eq!(problem.num_nodes(), case.nodes.len());
        assert_eq!(problem.unknowns_per_node(), 2);
        assert!(problem.validate().is_ok());
        assert!(case.model_stack().validate(&case.model_context()).is_ok());
    }

    #[test]
    fn parse_takeoff_case() {
        let case = parse_case(TAKEOFF).unwrap();
        assert!(case.options.ground_roll);
        assert_eq!(
            case.options.newton.line_search,
            LineSearchDef::Backtracking {
                beta: 0.5,
                max_steps: 10
            }
        );
        let problem = case.problem();
        assert_eq!(problem.unknowns_per_node(), 1);
        assert!((problem.aircraft.rolling_friction - 0.02).abs() < 1e-15);
    }

    #[test]
    fn missing_tolerance_is_a_parse_error() {
        let yaml = r#"
name: bad
options:
  newton: { max_iterations: 10 }
  throttle: { max_iterations: 10, tolerance: 1.0e-10 }
aerodynamics: []
nodes: []
"#;
        assert!(matches!(parse_case(yaml), Err(CliError::Yaml(_))));
    }

    #[test]
    fn empty_aerodynamics_is_rejected() {
        let yaml = r#"
name: bad
options:
  newton: { max_iterations: 10, tolerance: 1.0e-8 }
  throttle: { max_iterations: 10, tolerance: 1.0e-10 }
aerodynamics: []
nodes:
  - { altitude_m: 0.0, speed: 50.0, mass_kg: 1000.0 }
"#;
        assert!(matches!(parse_case(yaml), Err(CliError::Case { .. })));
    }

    #[test]
    fn node_inputs_default_to_level_flight_at_10000_ft_and_250_kn() {
        let yaml = r#"
name: defaults
options:
  newton: { max_iterations: 10, tolerance: 1.0e-8 }
  throttle: { max_iterations: 10, tolerance: 1.0e-10 }
aerodynamics:
  - { name: wing, wing_area_m2: 100.0, cl0: 0.2, cl_alpha: 5.0, cd0: 0.02, induced_factor: 0.05 }
nodes:
  - { mass_kg: 50000.0 }
"#;
        let case = parse_case(yaml).unwrap();
        let node = &case.nodes[0];
        assert!((node.altitude_m - 3048.0).abs() < 1e-9);
        assert!((node.speed - 128.611).abs() < 1e-3);
        assert_eq!(node.dh_dr, 0.0);
        assert_eq!(node.d2h_dr2, 0.0);
        assert_eq!(node.speed_rate, 0.0);
        assert!(node.throttle.is_none());
    }

    #[test]
    fn roundtrip_through_yaml() {
        let case = parse_case(CRUISE).unwrap();
        let text = serde_yaml::to_string(&case).unwrap();
        assert_eq!(parse_case(&text).unwrap(), case);
    }
}
