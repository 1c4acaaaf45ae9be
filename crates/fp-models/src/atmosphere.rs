//! Atmosphere property interface and the U.S. Standard Atmosphere 1976.

use crate::error::{ModelError, ModelResult};
use fp_core::numeric::ensure_finite;
use fp_core::units::constants::G0_MPS2;
use fp_core::units::{
    Density, DynVisc, Length, Pressure, Temperature, Velocity, k, kgpm3, mps, pa, pas,
};

/// Ambient properties at one altitude.
#[derive(Clone, Debug, PartialEq)]
pub struct AtmosphereState {
    pub temperature: Temperature,
    pub pressure: Pressure,
    pub density: Density,
    pub speed_of_sound: Velocity,
    pub viscosity: DynVisc,
    /// drho/dh [kg/m^4]
    pub density_lapse: f64,
    /// da/dh [1/s]
    pub speed_of_sound_lapse: f64,
}

/// Altitude → ambient properties. Pure; must be thread-safe.
pub trait AtmosphereModel: Send + Sync {
    /// Model name (for logging).
    fn name(&self) -> &str;

    /// Properties at the given geometric altitude.
    fn properties(&self, altitude: Length) -> ModelResult<AtmosphereState>;
}

/// Specific gas constant of dry air [J/(kg·K)]
const R_AIR: f64 = 287.053;
/// Ratio of specific heats for air
const GAMMA_AIR: f64 = 1.4;
/// Effective earth radius used for geopotential altitude [m]
const R_EARTH: f64 = 6_356_766.0;
/// Sutherland constants
const SUTHERLAND_BETA: f64 = 1.458e-6;
const SUTHERLAND_S: f64 = 110.4;

/// (base geopotential altitude [m], base temperature [K], lapse rate [K/m])
const LAYERS: [(f64, f64, f64); 7] = [
    (0.0, 288.15, -0.0065),
    (11_000.0, 216.65, 0.0),
    (20_000.0, 216.65, 0.001),
    (32_000.0, 228.65, 0.0028),
    (47_000.0, 270.65, 0.0),
    (51_000.0, 270.65, -0.0028),
    (71_000.0, 214.65, -0.002),
];

/// Top of the modelled region, geometric [m]
const MAX_ALTITUDE: f64 = 86_000.0;
/// Bottom of the modelled region, geometric [m]
const MIN_ALTITUDE: f64 = -2_000.0;

const P_SL: f64 = 101_325.0;

/// U.S. Standard Atmosphere 1976, geometric altitude -2 km to 86 km.
#[derive(Clone, Debug)]
pub struct StandardAtmosphere {
    /// Pressure at the base of each layer, precomputed.
    base_pressure: [f64; 7],
}

impl StandardAtmosphere {
    pub fn new() -> Self {
        let mut base_pressure = [P_SL; 7];
        for i in 1..LAYERS.len() {
            let (h_b, t_b, lapse) = LAYERS[i - 1];
            let (h_top, _, _) = LAYERS[i];
            base_pressure[i] = layer_pressure(base_pressure[i - 1], t_b, lapse, h_top - h_b);
        }
        Self { base_pressure }
    }
}

impl Default for StandardAtmosphere {
    fn default() -> Self {
        Self::new()
    }
}

fn layer_pressure(p_base: f64, t_base: f64, lapse: f64, dh: f64) -> f64 {
    if lapse == 0.0 {
        p_base * (-G0_MPS2 * dh / (R_AIR * t_base)).exp()
    } else {
        let t = t_base + lapse * dh;
        p_base * (t_base / t).powf(G0_MPS2 / (R_AIR * lapse))
    }
}

impl AtmosphereModel for StandardAtmosphere {
    fn name(&self) -> &str {
        "USatm1976"
    }

    fn properties(&self, altitude: Length) -> ModelResult<AtmosphereState> {
        let z = ensure_finite(altitude.value, "altitude")?;
        if !(MIN_ALTITUDE..=MAX_ALTITUDE).contains(&z) {
            return Err(ModelError::OutOfRange {
                what: "altitude",
                value: z,
            });
        }

        // Geopotential altitude and its derivative w.r.t. geometric altitude
        let h = R_EARTH * z / (R_EARTH + z);
        let dh_dz = (R_EARTH / (R_EARTH + z)).powi(2);

        let layer = LAYERS
            .iter()
            .rposition(|&(h_b, _, _)| h >= h_b)
            .unwrap_or(0);
        let (h_b, t_b, lapse) = LAYERS[layer];

        let t = t_b + lapse * (h - h_b);
        let p = layer_pressure(self.base_pressure[layer], t_b, lapse, h - h_b);
        let rho = p / (R_AIR * t);
        let a = (GAMMA_AIR * R_AIR * t).sqrt();
        let mu = SUTHERLAND_BETA * t.powf(1.5) / (t + SUTHERLAND_S);

        // Hydrostatic + ideal gas: drho/dH = -rho (g0 / (R T) + L / T)
        let drho_dz = -rho * (G0_MPS2 / (R_AIR * t) + lapse / t) * dh_dz;
        let da_dz = 0.5 * a / t * lapse * dh_dz;

        Ok(AtmosphereState {
            temperature: k(t),
            pressure: pa(p),
            density: kgpm3(rho),
            speed_of_sound: mps(a),
            viscosity: pas(mu),
            density_lapse: drho_dz,
            speed_of_sound_lapse: da_dz,
        })
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use fp_core::units::m;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn density_decreases_with_altitude(z in 0.0_f64..85_000.0, dz in 1.0_f64..1_000.0) {
            let atm = StandardAtmosphere::new();
            let lo = atm.properties(m(z)).unwrap();
            if let Ok(hi) = atm.properties(m(z + dz)) {
                prop_assert!(hi.density.value < lo.density.value);
                prop_assert!(hi.pressure.value < lo.pressure.value);
            }
        }

        #[test]
        fn ideal_gas_law_holds(z in -2_000.0_f64..86_000.0) {
            let atm = StandardAtmosphere::new();
            let s = atm.properties(m(z)).unwrap();
            let p = s.density.value * R_AIR * s.temperature.value;
            prop_assert!((p - s.pressure.value).abs() <= 1e-9 * s.pressure.value);
        }
    }
}
