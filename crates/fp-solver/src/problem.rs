//! Problem definition for the per-node control solve.

use crate::error::{SolverError, SolverResult};
use crate::initialization::InitialGuess;
use crate::newton::NewtonConfig;
use crate::throttle::ThrottleConfig;
use fp_core::units::{Angle, Curvature, Length, Mass, Slope, SpeedGradient, rad};
use fp_dynamics::{AircraftConfig, KinematicInput, SpeedType};

/// Prescribed state at one trajectory node.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryNode {
    pub altitude: Length,
    /// dh/dr [-]
    pub dh_dr: Slope,
    /// d2h/dr2 [1/m]
    pub d2h_dr2: Curvature,
    /// Airspeed in the configured `SpeedType` (m/s, or Mach number)
    pub speed: f64,
    /// Range rate of `speed`
    pub speed_rate: SpeedGradient,
    pub mass: Mass,
    /// Fixed throttle, used only when throttle balancing is off
    pub throttle: Option<f64>,
    /// Angle of attack on the ground, where it is an input rather than an unknown
    pub ground_alpha: Angle,
}

impl TrajectoryNode {
    /// Steady, level node.
    pub fn level(altitude: Length, speed: f64, mass: Mass) -> Self {
        Self {
            altitude,
            dh_dr: 0.0,
            d2h_dr2: 0.0,
            speed,
            speed_rate: 0.0,
            mass,
            throttle: None,
            ground_alpha: rad(0.0),
        }
    }

    pub fn with_path(mut self, dh_dr: Slope, d2h_dr2: Curvature) -> Self {
        self.dh_dr = dh_dr;
        self.d2h_dr2 = d2h_dr2;
        self
    }

    pub fn with_speed_rate(mut self, speed_rate: SpeedGradient) -> Self {
        self.speed_rate = speed_rate;
        self
    }

    pub fn with_throttle(mut self, throttle: f64) -> Self {
        self.throttle = Some(throttle);
        self
    }

    pub fn with_ground_alpha(mut self, alpha: Angle) -> Self {
        self.ground_alpha = alpha;
        self
    }

    pub(crate) fn kinematics(&self) -> KinematicInput {
        KinematicInput {
            altitude: self.altitude,
            dh_dr: self.dh_dr,
            d2h_dr2: self.d2h_dr2,
            speed: self.speed,
            speed_rate: self.speed_rate,
        }
    }
}

/// Solve-wide options.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveOptions {
    pub speed_type: SpeedType,
    /// Every node is confined to the ground; only thrust is solved
    pub ground_roll: bool,
    /// Cruise aerodynamics instead of low-speed (flaps/gear)
    pub clean: bool,
    /// Run the nested throttle balance inside every residual evaluation
    pub balance_throttle: bool,
    pub newton: NewtonConfig,
    pub throttle: ThrottleConfig,
    pub initial_guess: InitialGuess,
}

impl SolveOptions {
    /// TAS input, airborne, low-speed aerodynamics, no throttle balance.
    pub fn new(newton: NewtonConfig, throttle: ThrottleConfig) -> Self {
        Self {
            speed_type: SpeedType::Tas,
            ground_roll: false,
            clean: false,
            balance_throttle: false,
            newton,
            throttle,
            initial_guess: InitialGuess::standard(),
        }
    }

    pub fn with_speed_type(mut self, speed_type: SpeedType) -> Self {
        self.speed_type = speed_type;
        self
    }

    pub fn with_ground_roll(mut self, ground_roll: bool) -> Self {
        self.ground_roll = ground_roll;
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_throttle_balance(mut self, balance: bool) -> Self {
        self.balance_throttle = balance;
        self
    }

    pub fn with_initial_guess(mut self, guess: InitialGuess) -> Self {
        self.initial_guess = guess;
        self
    }
}

/// Control inversion problem: options, airframe and the node vector.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlProblem {
    pub options: SolveOptions,
    pub aircraft: AircraftConfig,
    pub nodes: Vec<TrajectoryNode>,
}

impl ControlProblem {
    pub fn new(options: SolveOptions, aircraft: AircraftConfig) -> Self {
        Self {
            options,
            aircraft,
            nodes: Vec::new(),
        }
    }

    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = TrajectoryNode>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Unknowns per node: thrust only on the ground, alpha and thrust otherwise.
    pub fn unknowns_per_node(&self) -> usize {
        if self.options.ground_roll { 1 } else { 2 }
    }

    /// Validate everything that does not need the models.
    ///
    /// Per-node physical inputs (mass, altitude, airspeed) are checked when
    /// the node is evaluated and reported as input-domain errors there.
    pub fn validate(&self) -> SolverResult<()> {
        if self.nodes.is_empty() {
            return Err(SolverError::ProblemSetup {
                what: "problem has no nodes".to_string(),
            });
        }
        self.options.newton.validate()?;
        self.options.throttle.validate()?;
        self.options.initial_guess.validate()?;

        if !self.aircraft.wing_incidence.value.is_finite()
            || !(self.aircraft.rolling_friction.is_finite()
                && self.aircraft.rolling_friction >= 0.0)
        {
            return Err(SolverError::ProblemSetup {
                what: "aircraft configuration must be finite with non-negative friction"
                    .to_string(),
            });
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(throttle) = node.throttle {
                if !(0.0..=1.0).contains(&throttle) {
                    return Err(SolverError::ProblemSetup {
                        what: format!("node {i}: throttle {throttle} outside [0, 1]"),
                    });
                }
            }
        }
        Ok(())
    }
}
