//! Plain numeric quantities with documented units.
//!
//! Values are `f64` throughout; the aliases only name the unit a field is in.

/// Degrees Celsius.
pub type Celsius = f64;
/// Liters.
pub type Liter = f64;
/// Liters per second.
pub type LiterPerSecond = f64;
/// Watts.
pub type Watt = f64;
/// Joules.
pub type Joule = f64;
/// Joules per liter per kelvin (volumetric specific heat).
pub type JoulePerLiterKelvin = f64;
/// Joules per kelvin (heat capacity).
pub type JoulePerKelvin = f64;
/// Watts per square meter (irradiance).
pub type WattPerMeterSquared = f64;
/// Square meters.
pub type MeterSquared = f64;
/// Dimensionless ratio, usually in `[0, 1]`.
pub type Ratio = f64;
/// Seconds.
pub type Second = f64;
