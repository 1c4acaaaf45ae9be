//! Per-node flight condition shared by every force model.

use fp_core::units::{Angle, Density, Length, Pace, Pressure, SpeedGradient, Velocity};

/// Canonical flight condition at one node.
///
/// Built once per solve from the prescribed kinematics and the atmosphere;
/// immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightCondition {
    /// Geometric altitude
    pub altitude: Length,
    /// True airspeed
    pub tas: Velocity,
    /// Equivalent airspeed
    pub eas: Velocity,
    /// Mach number
    pub mach: f64,
    /// Dynamic pressure 0.5 rho V^2
    pub dynamic_pressure: Pressure,
    /// Ambient density
    pub density: Density,
    /// Ambient speed of sound
    pub speed_of_sound: Velocity,
    /// Flight-path angle (zero when ground-confined)
    pub gamma: Angle,
    /// dgamma/dr [rad/m], `None` when ground-confined
    pub gamma_rate: Option<f64>,
    /// dTAS/dr [1/s]
    pub tas_rate: SpeedGradient,
    /// dt/dr [s/m]
    pub dt_dr: Pace,
}

impl FlightCondition {
    /// Horizontal ground speed dr/dt [m/s].
    pub fn range_rate(&self) -> f64 {
        self.tas.value * self.gamma.value.cos()
    }

    /// Whether the flight-path-angle dynamics are present.
    pub fn is_airborne(&self) -> bool {
        self.gamma_rate.is_some()
    }

    /// A level, sea-level condition at the given TAS. Handy for model tests.
    pub fn sea_level(tas_mps: f64) -> Self {
        use fp_core::units::{constants::RHO_SL, kgpm3, m, mps, pa, rad};
        let a = 340.294;
        Self {
            altitude: m(0.0),
            tas: mps(tas_mps),
            eas: mps(tas_mps),
            mach: tas_mps / a,
            dynamic_pressure: pa(0.5 * RHO_SL * tas_mps * tas_mps),
            density: kgpm3(RHO_SL),
            speed_of_sound: mps(a),
            gamma: rad(0.0),
            gamma_rate: Some(0.0),
            tas_rate: 0.0,
            dt_dr: 1.0 / tas_mps,
        }
    }
}
