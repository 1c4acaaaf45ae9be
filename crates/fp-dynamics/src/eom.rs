//! Point-mass equations of motion along the prescribed path.
//!
//! For a trial angle of attack and thrust the dynamic rates are compared with
//! the rates the trajectory implies:
//!
//! ```text
//! dV/dt     = (T cos(eps) - D - W sin(gamma) - mu N) / m
//! dgamma/dt = (L + T sin(eps) - W cos(gamma)) / (m V)
//! ```
//!
//! with `eps = alpha - i_wing`. On the ground gamma is zero, there is no
//! flight-path-angle equation and rolling friction acts on the normal force
//! `N = max(W - L - T sin(eps), 0)`.

use crate::error::{DynamicsError, DynamicsResult, check_input};
use fp_core::units::Angle;
use fp_core::units::constants::G0_MPS2;
use fp_models::{AeroForces, FlightCondition};

/// Airframe parameters that enter the equations of motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AircraftConfig {
    /// Wing incidence relative to the thrust line
    pub wing_incidence: Angle,
    /// Rolling friction coefficient, used only on the ground
    pub rolling_friction: f64,
}

/// Mismatch between kinematic and dynamic rates; zero at a balanced node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Residual {
    /// dgamma/dt mismatch [rad/s], absent on the ground
    pub gamma: Option<f64>,
    /// dV/dt mismatch [m/s^2]
    pub speed: f64,
}

impl Residual {
    /// Number of components (1 on the ground, 2 airborne).
    pub fn dimension(&self) -> usize {
        if self.gamma.is_some() { 2 } else { 1 }
    }

    /// Components in unknown order: `[gamma, speed]` or `[speed]`.
    pub fn components(&self) -> Vec<f64> {
        match self.gamma {
            Some(g) => vec![g, self.speed],
            None => vec![self.speed],
        }
    }

    /// Largest absolute component.
    pub fn max_norm(&self) -> f64 {
        fp_core::numeric::max_abs(&self.components())
    }
}

/// Rates, residual and auxiliary outputs at one trial point.
#[derive(Clone, Debug, PartialEq)]
pub struct EomOutput {
    pub residual: Residual,
    /// Force-implied dV/dt [m/s^2]
    pub dtas_dt: f64,
    /// Trajectory-implied dV/dt [m/s^2]
    pub dtas_dt_approx: f64,
    /// Force-implied dgamma/dt [rad/s]
    pub dgam_dt: Option<f64>,
    /// Trajectory-implied dgamma/dt [rad/s]
    pub dgam_dt_approx: Option<f64>,
    /// (L + T sin eps) / (W cos gamma)
    pub load_factor: f64,
    /// Ground reaction [N], zero when airborne
    pub normal_force: f64,
    /// gamma + alpha - i_wing [rad]
    pub fuselage_pitch: f64,
}

/// Evaluate the equations of motion for one node.
///
/// `thrust` is taken at face value; negative or very large trial thrust is
/// allowed so the outer balance can move freely.
pub fn evaluate_eom(
    fc: &FlightCondition,
    aircraft: &AircraftConfig,
    mass: f64,
    alpha: f64,
    thrust: f64,
    aero: &AeroForces,
) -> DynamicsResult<EomOutput> {
    let mass = check_input(mass, "mass")?;
    if mass <= 0.0 {
        return Err(DynamicsError::InputDomain {
            what: "mass",
            value: mass,
        });
    }
    let alpha = check_input(alpha, "alpha")?;
    let thrust = check_input(thrust, "thrust")?;
    let lift = check_input(aero.lift.value, "lift")?;
    let drag = check_input(aero.drag.value, "drag")?;

    let tas = fc.tas.value;
    let gamma = fc.gamma.value;
    let (sin_gam, cos_gam) = gamma.sin_cos();
    let weight = mass * G0_MPS2;

    let eps = alpha - aircraft.wing_incidence.value;
    let (sin_eps, cos_eps) = eps.sin_cos();
    let t_axial = thrust * cos_eps;
    let t_normal = thrust * sin_eps;

    let range_rate = tas * cos_gam;
    let dtas_dt_approx = fc.tas_rate * range_rate;

    let (dtas_dt, dgam_dt, dgam_dt_approx, normal_force) = match fc.gamma_rate {
        Some(gamma_rate) => {
            let dtas_dt = (t_axial - drag - weight * sin_gam) / mass;
            let dgam_dt = (lift + t_normal - weight * cos_gam) / (mass * tas);
            (dtas_dt, Some(dgam_dt), Some(gamma_rate * range_rate), 0.0)
        }
        None => {
            let normal = (weight - lift - t_normal).max(0.0);
            let friction = aircraft.rolling_friction * normal;
            ((t_axial - drag - friction) / mass, None, None, normal)
        }
    };

    let residual = Residual {
        gamma: match (dgam_dt_approx, dgam_dt) {
            (Some(approx), Some(dynamic)) => Some(approx - dynamic),
            _ => None,
        },
        speed: dtas_dt_approx - dtas_dt,
    };
    if !residual.max_norm().is_finite() {
        return Err(DynamicsError::NonPhysical { what: "residual" });
    }

    Ok(EomOutput {
        residual,
        dtas_dt,
        dtas_dt_approx,
        dgam_dt,
        dgam_dt_approx,
        load_factor: (lift + t_normal) / (weight * cos_gam),
        normal_force,
        fuselage_pitch: gamma + alpha - aircraft.wing_incidence.value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::units::{newtons, rad};

    fn clean_aircraft() -> AircraftConfig {
        AircraftConfig {
            wing_incidence: rad(0.0),
            rolling_friction: 0.0,
        }
    }

    fn forces(lift: f64, drag: f64) -> AeroForces {
        AeroForces {
            lift: newtons(lift),
            drag: newtons(drag),
        }
    }

    #[test]
    fn balanced_level_flight_has_zero_residual() {
        let fc = FlightCondition::sea_level(100.0);
        let mass = 1_000.0;
        let weight = mass * G0_MPS2;
        let out = evaluate_eom(&fc, &clean_aircraft(), mass, 0.0, 500.0, &forces(weight, 500.0))
            .unwrap();
        assert!(out.residual.max_norm() < 1e-12);
        assert!((out.load_factor - 1.0).abs() < 1e-12);
        assert_eq!(out.residual.dimension(), 2);
    }

    #[test]
    fn excess_thrust_shows_as_speed_residual() {
        let fc = FlightCondition::sea_level(100.0);
        let mass = 1_000.0;
        let weight = mass * G0_MPS2;
        let out = evaluate_eom(&fc, &clean_aircraft(), mass, 0.0, 1_500.0, &forces(weight, 500.0))
            .unwrap();
        // 1000 N surplus on 1000 kg: dynamic dV/dt = 1 m/s^2, trajectory wants 0
        assert!((out.dtas_dt - 1.0).abs() < 1e-12);
        assert!((out.residual.speed + 1.0).abs() < 1e-12);
    }

    #[test]
    fn climb_adds_weight_component() {
        let mut fc = FlightCondition::sea_level(100.0);
        fc.gamma = rad(0.1);
        let mass = 1_000.0;
        let weight = mass * G0_MPS2;
        let drag = 500.0;
        let thrust = drag + weight * 0.1_f64.sin();
        let lift = weight * 0.1_f64.cos();
        let out = evaluate_eom(&fc, &clean_aircraft(), mass, 0.0, thrust, &forces(lift, drag))
            .unwrap();
        assert!(out.residual.max_norm() < 1e-10);
    }

    #[test]
    fn incidence_tilts_thrust() {
        let fc = FlightCondition::sea_level(100.0);
        let aircraft = AircraftConfig {
            wing_incidence: rad(0.05),
            rolling_friction: 0.0,
        };
        let out = evaluate_eom(&fc, &aircraft, 1_000.0, 0.05, 1_000.0, &forces(0.0, 0.0)).unwrap();
        // eps = 0: thrust fully axial
        assert!((out.dtas_dt - 1.0).abs() < 1e-12);
        assert!(out.fuselage_pitch.abs() < 1e-15);
    }

    #[test]
    fn ground_roll_drops_gamma_and_adds_friction() {
        let mut fc = FlightCondition::sea_level(40.0);
        fc.gamma_rate = None;
        fc.tas_rate = 2.0 / 40.0; // 2 m/s^2 along the runway
        let mass = 1_000.0;
        let weight = mass * G0_MPS2;
        let aircraft = AircraftConfig {
            wing_incidence: rad(0.0),
            rolling_friction: 0.02,
        };
        let lift = 0.25 * weight;
        let drag = 300.0;
        let friction = 0.02 * (weight - lift);
        let thrust = mass * 2.0 + drag + friction;
        let out = evaluate_eom(&fc, &aircraft, mass, 0.0, thrust, &forces(lift, drag)).unwrap();
        assert!(out.residual.gamma.is_none());
        assert_eq!(out.residual.dimension(), 1);
        assert!(out.residual.speed.abs() < 1e-12);
        assert!((out.normal_force - (weight - lift)).abs() < 1e-9);
    }

    #[test]
    fn ground_normal_force_never_negative() {
        let mut fc = FlightCondition::sea_level(80.0);
        fc.gamma_rate = None;
        let aircraft = AircraftConfig {
            wing_incidence: rad(0.0),
            rolling_friction: 0.02,
        };
        let out = evaluate_eom(&fc, &aircraft, 1_000.0, 0.0, 0.0, &forces(1.0e5, 0.0)).unwrap();
        assert_eq!(out.normal_force, 0.0);
        assert_eq!(out.dtas_dt, 0.0);
    }

    #[test]
    fn rejects_non_positive_mass() {
        let fc = FlightCondition::sea_level(80.0);
        let err = evaluate_eom(&fc, &clean_aircraft(), 0.0, 0.0, 0.0, &forces(0.0, 0.0));
        assert!(matches!(err, Err(DynamicsError::InputDomain { what: "mass", .. })));
    }
}
