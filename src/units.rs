//! Fixed unit conversion factors shared by every model in the crate.

/// Metres per foot (exact).
pub const FT_TO_M: f64 = 0.3048;

/// Cubic metres per cubic foot (exact, `0.3048³`).
pub const CUBIC_FT_TO_CUBIC_M: f64 = 0.028_316_846_592;

/// Cubic centimetres per cubic micrometre.
pub const CUBIC_UM_TO_CUBIC_CM: f64 = 1e-12;

/// Cubic metres per cubic centimetre.
pub const CUBIC_CM_TO_CUBIC_M: f64 = 1e-6;

/// Millilitres per cubic metre.
pub const CUBIC_M_TO_ML: f64 = 1e6;

pub const MINUTES_PER_HOUR: f64 = 60.0;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Metres per millimetre.
pub const MM_TO_M: f64 = 1e-3;

/// Converts a length in feet to metres.
#[must_use]
pub fn feet_to_metres(feet: f64) -> f64 {
    feet * FT_TO_M
}

/// Converts a volume in cubic feet to cubic metres.
#[must_use]
pub fn cubic_feet_to_cubic_metres(cubic_feet: f64) -> f64 {
    cubic_feet * CUBIC_FT_TO_CUBIC_M
}
