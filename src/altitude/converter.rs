//! # Altitude Converter
//!
//! Converts a barometric pressure measurement into an altitude above a
//! reference pressure using the international barometric formula:
//!
//! ```text
//! altitude = 44330 * (1 - (p / p0)^(1/5.255))
//! ```
//!
//! where `p` is the measured pressure and `p0` the reference pressure, both in
//! hectopascals. With `p0` set to the standard atmosphere (1013.25 hPa) the
//! result is altitude above mean sea level (AMSL).
//!
//! The converter performs no rounding; callers decide the rounding policy.
//! The rest of this crate rounds to the nearest whole meter before display and
//! threshold comparison, so detection arithmetic happens on integer meters.

use crate::error::{FlightVoiceError, Result};

/// Standard atmosphere pressure at sea level, in hectopascals.
pub const PRESSURE_STANDARD_ATMOSPHERE_HPA: f64 = 1013.25;

/// Scale constant of the barometric formula, in meters.
const BAROMETRIC_SCALE_M: f64 = 44330.0;

/// Exponent denominator of the barometric formula.
const BAROMETRIC_EXPONENT: f64 = 5.255;

/// Compute altitude in meters above the level of `reference_hpa`.
///
/// # Arguments
///
/// * `reference_hpa` - Reference pressure in hectopascals (must be finite and > 0)
/// * `measured_hpa` - Measured pressure in hectopascals (must be finite and > 0)
///
/// # Returns
///
/// * `Result<f64>` - Altitude in meters, unrounded
///
/// # Errors
///
/// Returns [`FlightVoiceError::InvalidPressure`] if either pressure is zero,
/// negative, NaN or infinite — the formula is undefined there.
///
/// # Examples
///
/// ```
/// use flight_voice::altitude::converter::{altitude_above, PRESSURE_STANDARD_ATMOSPHERE_HPA};
///
/// let alt = altitude_above(PRESSURE_STANDARD_ATMOSPHERE_HPA, PRESSURE_STANDARD_ATMOSPHERE_HPA)?;
/// assert!(alt.abs() < 1e-9); // same pressure means zero altitude
/// # Ok::<(), flight_voice::error::FlightVoiceError>(())
/// ```
pub fn altitude_above(reference_hpa: f64, measured_hpa: f64) -> Result<f64> {
    validate_pressure(reference_hpa)?;
    validate_pressure(measured_hpa)?;

    Ok(BAROMETRIC_SCALE_M * (1.0 - (measured_hpa / reference_hpa).powf(1.0 / BAROMETRIC_EXPONENT)))
}

/// Compute altitude above mean sea level, using the standard atmosphere
/// reference pressure.
///
/// # Arguments
///
/// * `measured_hpa` - Measured pressure in hectopascals (must be finite and > 0)
///
/// # Errors
///
/// Returns [`FlightVoiceError::InvalidPressure`] for zero, negative or
/// non-finite pressures.
///
/// # Examples
///
/// ```
/// use flight_voice::altitude::converter::altitude_amsl;
///
/// // Lower pressure than the standard atmosphere means positive altitude
/// let alt = altitude_amsl(1000.0)?;
/// assert!(alt > 0.0);
/// # Ok::<(), flight_voice::error::FlightVoiceError>(())
/// ```
pub fn altitude_amsl(measured_hpa: f64) -> Result<f64> {
    altitude_above(PRESSURE_STANDARD_ATMOSPHERE_HPA, measured_hpa)
}

/// Round an altitude to the nearest whole meter.
///
/// Rounding to whole meters before comparison is a deliberate precision
/// choice: the takeoff threshold is expressed in whole meters and the delta
/// arithmetic happens on the rounded values.
#[must_use]
pub fn round_to_meters(altitude_m: f64) -> i64 {
    altitude_m.round() as i64
}

/// Reject pressures the barometric formula is undefined for.
fn validate_pressure(pressure_hpa: f64) -> Result<()> {
    if !pressure_hpa.is_finite() || pressure_hpa <= 0.0 {
        return Err(FlightVoiceError::InvalidPressure {
            value: pressure_hpa,
        });
    }
    Ok(())
}

/// Inverse of the barometric formula, for building test pressures.
#[cfg(test)]
pub(crate) fn pressure_at_altitude(altitude_m: f64) -> f64 {
    PRESSURE_STANDARD_ATMOSPHERE_HPA
        * (1.0 - altitude_m / BAROMETRIC_SCALE_M).powf(BAROMETRIC_EXPONENT)
}
