// fp-core/src/units.rs

use uom::si::f64::{
    Angle as UomAngle, Area as UomArea, DynamicViscosity as UomDynamicViscosity,
    Force as UomForce, Length as UomLength, Mass as UomMass, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Angle = UomAngle;
pub type Area = UomArea;
pub type DynVisc = UomDynamicViscosity;
pub type Force = UomForce;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;

// Derivatives with respect to range. uom has no tidy dimension for these,
// so they stay plain SI floats.

/// dh/dr [m/m]
pub type Slope = f64;
/// d2h/dr2 [1/m]
pub type Curvature = f64;
/// dV/dr [(m/s)/m = 1/s], or dMach/dr [1/m] for Mach input
pub type SpeedGradient = f64;
/// dt/dr [s/m]
pub type Pace = f64;
/// dmass/dr [kg/m]
pub type MassPerRange = f64;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn ft(v: f64) -> Length {
    use uom::si::length::foot;
    Length::new::<foot>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn knots(v: f64) -> Velocity {
    use uom::si::velocity::knot;
    Velocity::new::<knot>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn newtons(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m2(v: f64) -> Area {
    use uom::si::area::square_meter;
    Area::new::<square_meter>(v)
}

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn pas(v: f64) -> DynVisc {
    use uom::si::dynamic_viscosity::pascal_second;
    DynVisc::new::<pascal_second>(v)
}

pub mod constants {
    pub const G0_MPS2: f64 = 9.806_65;

    /// Sea-level standard density [kg/m^3]
    pub const RHO_SL: f64 = 1.225;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _h = m(3048.0);
        let _v = mps(128.6);
        let _w = kg(60_000.0);
        let _t = newtons(1.0e4);
        let _a = rad(0.05);
        let _mdot = kgps(1.2);
        let _s = m2(120.0);
        let _p = pa(101_325.0);
        let _temp = k(288.15);
        let _rho = kgpm3(1.225);
        let _mu = pas(1.8e-5);
    }

    #[test]
    fn imperial_constructors_convert_to_si() {
        assert!((ft(10_000.0).value - 3048.0).abs() < 1e-9);
        assert!((knots(250.0).value - 128.611).abs() < 1e-3);
        assert!((deg(180.0).value - std::f64::consts::PI).abs() < 1e-12);
    }
}
