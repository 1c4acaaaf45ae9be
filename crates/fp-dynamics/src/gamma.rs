//! Flight-path angle from the altitude profile.

use crate::error::{DynamicsResult, check_input};
use fp_core::units::{Curvature, Slope};

/// Flight-path angle and its derivative with respect to range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightPathAngle {
    /// gamma [rad]
    pub gamma: f64,
    /// dgamma/dr [rad/m]
    pub gamma_rate: f64,
}

/// `gamma = atan(dh/dr)`, `dgamma/dr = (d2h/dr2) / (1 + (dh/dr)^2)`.
pub fn flight_path_angle(dh_dr: Slope, d2h_dr2: Curvature) -> DynamicsResult<FlightPathAngle> {
    let dh_dr = check_input(dh_dr, "dh/dr")?;
    let d2h_dr2 = check_input(d2h_dr2, "d2h/dr2")?;
    Ok(FlightPathAngle {
        gamma: dh_dr.atan(),
        gamma_rate: d2h_dr2 / (1.0 + dh_dr * dh_dr),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_flight_is_zero() {
        let fpa = flight_path_angle(0.0, 0.0).unwrap();
        assert_eq!(fpa.gamma, 0.0);
        assert_eq!(fpa.gamma_rate, 0.0);
    }

    #[test]
    fn forty_five_degree_climb() {
        let fpa = flight_path_angle(1.0, 0.2).unwrap();
        assert!((fpa.gamma - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
        assert!((fpa.gamma_rate - 0.1).abs() < 1e-12);
    }

    #[test]
    fn non_finite_slope_is_rejected() {
        assert!(flight_path_angle(f64::INFINITY, 0.0).is_err());
    }
}
