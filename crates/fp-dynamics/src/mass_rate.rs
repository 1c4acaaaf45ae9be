//! Fuel-mass depletion per unit range.

use crate::error::{DynamicsResult, check_input};
use fp_core::units::{MassPerRange, MassRate, Pace};

/// `dmass/dr = -fuel_flow * dt/dr` [kg/m]; negative while burning fuel.
pub fn mass_rate(fuel_flow: MassRate, dt_dr: Pace) -> DynamicsResult<MassPerRange> {
    let fuel_flow = check_input(fuel_flow.value, "fuel flow")?;
    let dt_dr = check_input(dt_dr, "dt/dr")?;
    Ok(-fuel_flow * dt_dr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_core::units::kgps;

    #[test]
    fn burning_fuel_reduces_mass() {
        // 1.2 kg/s at 200 m/s covers 1 m every 5 ms
        let dm = mass_rate(kgps(1.2), 1.0 / 200.0).unwrap();
        assert!((dm + 0.006).abs() < 1e-15);
    }

    #[test]
    fn no_fuel_flow_no_mass_change() {
        assert_eq!(mass_rate(kgps(0.0), 0.01).unwrap(), 0.0);
    }

    #[test]
    fn non_finite_pace_is_rejected() {
        assert!(mass_rate(kgps(1.0), f64::INFINITY).is_err());
    }
}
