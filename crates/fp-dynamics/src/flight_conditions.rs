//! Flight conditions from prescribed kinematics.
//!
//! The airspeed may be given as true airspeed, equivalent airspeed or Mach.
//! Its range rate is converted to dTAS/dr through the chain rule, using the
//! atmosphere's density and speed-of-sound lapse rates where the conversion
//! factor itself varies with altitude.

use crate::error::{DynamicsError, DynamicsResult, check_input};
use crate::gamma::flight_path_angle;
use fp_core::numeric::ensure_positive;
use fp_core::units::constants::RHO_SL;
use fp_core::units::{Curvature, Length, Slope, SpeedGradient, mps, pa, rad};
use fp_models::{AtmosphereState, FlightCondition};

/// Representation of the airspeed input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpeedType {
    /// True airspeed [m/s]
    #[default]
    Tas,
    /// Equivalent airspeed [m/s]
    Eas,
    /// Mach number [-]
    Mach,
}

impl SpeedType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedType::Tas => "TAS",
            SpeedType::Eas => "EAS",
            SpeedType::Mach => "Mach",
        }
    }
}

/// Prescribed kinematics at one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinematicInput {
    pub altitude: Length,
    pub dh_dr: Slope,
    pub d2h_dr2: Curvature,
    /// Airspeed in the configured `SpeedType` (m/s, or Mach number)
    pub speed: f64,
    /// Range rate of `speed`
    pub speed_rate: SpeedGradient,
}

/// Derive the canonical flight condition for one node.
///
/// When `ground_roll` is set the flight-path angle is pinned at zero and the
/// altitude rates are ignored.
pub fn compute_flight_condition(
    input: &KinematicInput,
    speed_type: SpeedType,
    ground_roll: bool,
    atmos: &AtmosphereState,
) -> DynamicsResult<FlightCondition> {
    let altitude = check_input(input.altitude.value, "altitude")?;
    if altitude < 0.0 {
        return Err(DynamicsError::InputDomain {
            what: "altitude",
            value: altitude,
        });
    }
    let speed = check_input(input.speed, "airspeed")?;
    if speed <= 0.0 {
        return Err(DynamicsError::InputDomain {
            what: "airspeed",
            value: speed,
        });
    }
    let speed_rate = check_input(input.speed_rate, "airspeed rate")?;

    let rho = ensure_positive(atmos.density.value, "density")?;
    let sos = ensure_positive(atmos.speed_of_sound.value, "speed of sound")?;

    let (gamma, gamma_rate, dh_dr) = if ground_roll {
        (0.0, None, 0.0)
    } else {
        let fpa = flight_path_angle(input.dh_dr, input.d2h_dr2)?;
        (fpa.gamma, Some(fpa.gamma_rate), input.dh_dr)
    };

    let sqrt_sigma = (rho / RHO_SL).sqrt();
    let (tas, tas_rate) = match speed_type {
        SpeedType::Tas => (speed, speed_rate),
        SpeedType::Eas => {
            let tas = speed / sqrt_sigma;
            let drho_dr = atmos.density_lapse * dh_dr;
            let density_term = 0.5 * speed * RHO_SL.sqrt() * rho.powf(-1.5) * drho_dr;
            (tas, speed_rate / sqrt_sigma - density_term)
        }
        SpeedType::Mach => {
            let tas = speed * sos;
            let da_dr = atmos.speed_of_sound_lapse * dh_dr;
            (tas, speed_rate * sos + speed * da_dr)
        }
    };

    let cos_gamma = gamma.cos();
    let dt_dr = 1.0 / (tas * cos_gamma);
    if !dt_dr.is_finite() || !tas_rate.is_finite() {
        return Err(DynamicsError::NonPhysical { what: "time per range" });
    }

    Ok(FlightCondition {
        altitude: input.altitude,
        tas: mps(tas),
        eas: mps(tas * sqrt_sigma),
        mach: tas / sos,
        dynamic_pressure: pa(0.5 * rho * tas * tas),
        density: atmos.density,
        speed_of_sound: atmos.speed_of_sound,
        gamma: rad(gamma),
        gamma_rate,
        tas_rate,
        dt_dr,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::units::{ft, knots, m};
    use fp_models::{AtmosphereModel, StandardAtmosphere};

    fn input(altitude: Length, speed: f64) -> KinematicInput {
        KinematicInput {
            altitude,
            dh_dr: 0.0,
            d2h_dr2: 0.0,
            speed,
            speed_rate: 0.0,
        }
    }

    #[test]
    fn tas_input_level_flight() {
        let atm = StandardAtmosphere::new();
        let h = ft(10_000.0);
        let state = atm.properties(h).unwrap();
        let fc =
            compute_flight_condition(&input(h, knots(250.0).value), SpeedType::Tas, false, &state)
                .unwrap();
        assert!((fc.tas.value - 128.611).abs() < 1e-3);
        assert_eq!(fc.gamma.value, 0.0);
        assert_eq!(fc.gamma_rate, Some(0.0));
        let q = 0.5 * state.density.value * fc.tas.value.powi(2);
        assert!((fc.dynamic_pressure.value - q).abs() < 1e-9);
        assert!((fc.mach - fc.tas.value / state.speed_of_sound.value).abs() < 1e-12);
        assert!((fc.dt_dr - 1.0 / fc.tas.value).abs() < 1e-15);
    }

    #[test]
    fn climb_angle_shortens_range_rate() {
        let atm = StandardAtmosphere::new();
        let h = m(1_000.0);
        let state = atm.properties(h).unwrap();
        let mut inp = input(h, 100.0);
        inp.dh_dr = 0.1;
        let fc = compute_flight_condition(&inp, SpeedType::Tas, false, &state).unwrap();
        assert!((fc.gamma.value - 0.1_f64.atan()).abs() < 1e-12);
        assert!((fc.range_rate() - 100.0 * fc.gamma.value.cos()).abs() < 1e-9);
    }

    #[test]
    fn ground_roll_drops_gamma() {
        let atm = StandardAtmosphere::new();
        let h = m(0.0);
        let state = atm.properties(h).unwrap();
        let mut inp = input(h, 30.0);
        inp.dh_dr = 0.3;
        let fc = compute_flight_condition(&inp, SpeedType::Tas, true, &state).unwrap();
        assert_eq!(fc.gamma.value, 0.0);
        assert!(fc.gamma_rate.is_none());
        assert!(!fc.is_airborne());
    }

    #[test]
    fn eas_and_mach_inputs_agree_with_tas() {
        let atm = StandardAtmosphere::new();
        let h = m(5_000.0);
        let state = atm.properties(h).unwrap();
        let tas = 150.0;
        let sigma = state.density.value / RHO_SL;

        let from_eas = compute_flight_condition(
            &input(h, tas * sigma.sqrt()),
            SpeedType::Eas,
            false,
            &state,
        )
        .unwrap();
        let from_mach = compute_flight_condition(
            &input(h, tas / state.speed_of_sound.value),
            SpeedType::Mach,
            false,
            &state,
        )
        .unwrap();
        assert!((from_eas.tas.value - tas).abs() < 1e-9);
        assert!((from_mach.tas.value - tas).abs() < 1e-9);
        assert!((from_eas.eas.value - tas * sigma.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn constant_eas_climb_accelerates_tas() {
        // Holding EAS while climbing means TAS grows as density falls.
        let atm = StandardAtmosphere::new();
        let h = 3_000.0;
        let dh_dr = 0.05;
        let eas = 120.0;
        let state = atm.properties(m(h)).unwrap();
        let mut inp = input(m(h), eas);
        inp.dh_dr = dh_dr;
        let fc = compute_flight_condition(&inp, SpeedType::Eas, false, &state).unwrap();
        assert!(fc.tas_rate > 0.0);

        // Central difference of TAS along the path
        let dr = 1.0;
        let tas_at = |r: f64| {
            let s = atm.properties(m(h + dh_dr * r)).unwrap();
            eas / (s.density.value / RHO_SL).sqrt()
        };
        let fd = (tas_at(dr) - tas_at(-dr)) / (2.0 * dr);
        assert!((fd - fc.tas_rate).abs() < 1e-8);
    }

    #[test]
    fn constant_mach_climb_follows_speed_of_sound() {
        let atm = StandardAtmosphere::new();
        let h = 4_000.0;
        let dh_dr = 0.05;
        let mach = 0.6;
        let state = atm.properties(m(h)).unwrap();
        let mut inp = input(m(h), mach);
        inp.dh_dr = dh_dr;
        let fc = compute_flight_condition(&inp, SpeedType::Mach, false, &state).unwrap();
        // Troposphere: a falls with altitude, so TAS falls at constant Mach
        assert!(fc.tas_rate < 0.0);
        assert!((fc.tas_rate - mach * state.speed_of_sound_lapse * dh_dr).abs() < 1e-12);
    }

    #[test]
    fn invalid_inputs_are_reported_not_clamped() {
        let atm = StandardAtmosphere::new();
        let state = atm.properties(m(0.0)).unwrap();
        let neg_alt =
            compute_flight_condition(&input(m(-10.0), 50.0), SpeedType::Tas, false, &state);
        assert!(matches!(
            neg_alt,
            Err(DynamicsError::InputDomain { what: "altitude", .. })
        ));
        let zero_speed =
            compute_flight_condition(&input(m(0.0), 0.0), SpeedType::Tas, false, &state);
        assert!(matches!(
            zero_speed,
            Err(DynamicsError::InputDomain { what: "airspeed", .. })
        ));
        let mut bad_atmos = state.clone();
        bad_atmos.density = fp_core::units::kgpm3(-1.0);
        let bad = compute_flight_condition(&input(m(0.0), 50.0), SpeedType::Tas, false, &bad_atmos);
        assert!(matches!(bad, Err(DynamicsError::InputDomain { what: "density", .. })));
    }
}
