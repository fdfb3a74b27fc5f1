//! # Takeoff Detector
//!
//! Owns the reference-altitude capture and the one-shot takeoff transition.
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --first valid sample--> Armed --delta > threshold--> Fired
//! ```
//!
//! The first valid sample captures the reference state: the sample's AMSL
//! altitude rounded to whole meters, minus a fixed offset (1 m by default).
//! Every later sample is converted the same way and compared against that
//! reference; the first sample whose delta strictly exceeds the threshold
//! fires the takeoff event. `Fired` is terminal — the detector keeps updating
//! the current reading for display but never emits a second event, never
//! re-arms, and never reverts, even if the altitude later drops back.
//!
//! The reference offset and the use of the standard-atmosphere pressure for
//! every conversion (rather than the captured takeoff pressure) are deliberate
//! calibration choices; threshold comparisons depend on this exact arithmetic.
//!
//! ## Usage
//!
//! ```
//! use flight_voice::altitude::detector::TakeoffDetector;
//! use flight_voice::barometer::PressureSample;
//!
//! let mut detector = TakeoffDetector::new();
//! let outcome = detector.process_sample(&PressureSample::new(1013.25))?;
//!
//! assert_eq!(outcome.reading.altitude_amsl_m, 0);
//! assert!(outcome.event.is_none()); // the capture sample never fires
//! # Ok::<(), flight_voice::error::FlightVoiceError>(())
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::altitude::converter;
use crate::barometer::PressureSample;
use crate::error::Result;

/// Altitude delta above the reference that must be strictly exceeded for
/// takeoff to be detected, in meters.
pub const TAKEOFF_DETECT_DELTA_M: i64 = 1;

/// Offset applied to the captured reference altitude, in meters.
pub const REFERENCE_OFFSET_M: i64 = -1;

/// Reference state captured from the first sample.
///
/// Immutable after capture; owned exclusively by the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceState {
    /// Pressure of the capture sample, in hectopascals.
    pub reference_pressure_hpa: f64,
    /// Reference altitude in whole meters AMSL, offset already applied.
    pub reference_altitude_m: i64,
}

/// Altitude derived from the most recent sample.
///
/// Recomputed on every sample; only the latest value is retained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeReading {
    /// Altitude above mean sea level, in whole meters.
    pub altitude_amsl_m: i64,
    /// Altitude above the reference, in whole meters.
    pub altitude_delta_m: i64,
    /// Pressure the reading was derived from, in hectopascals.
    pub source_pressure_hpa: f64,
}

/// The one-shot takeoff event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TakeoffEvent {
    /// Detection time in milliseconds since the Unix epoch.
    pub detected_at_epoch_ms: i64,
    /// The reference altitude takeoff was measured against, in meters AMSL.
    pub reference_altitude_m: i64,
}

/// Detector lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// No sample seen yet.
    Uninitialized,
    /// Reference captured, watching for takeoff.
    Armed,
    /// Takeoff event emitted; terminal.
    Fired,
}

impl DetectorState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Armed => "armed",
            Self::Fired => "fired",
        }
    }
}

/// Internal phase, carrying the reference so `Armed`/`Fired` cannot exist
/// without one.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Uninitialized,
    Armed { reference: ReferenceState },
    Fired { reference: ReferenceState },
}

/// Result of processing one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOutcome {
    /// The updated current reading.
    pub reading: AltitudeReading,
    /// The takeoff event, present at most once over the detector's lifetime.
    pub event: Option<TakeoffEvent>,
}

/// Read-only view of the detector for presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSnapshot {
    /// Captured reference, `None` before the first sample.
    pub reference: Option<ReferenceState>,
    /// Most recent reading, `None` before the first sample.
    pub reading: Option<AltitudeReading>,
    /// Whether the takeoff event has been emitted.
    pub fired: bool,
}

/// Stateful one-shot takeoff detector.
///
/// Consumes a stream of pressure samples in arrival order and emits at most
/// one [`TakeoffEvent`]. The detector is the single owner of its reference
/// and reading; all access goes through [`process_sample`](Self::process_sample)
/// and [`snapshot`](Self::snapshot).
#[derive(Debug)]
pub struct TakeoffDetector {
    phase: Phase,
    reading: Option<AltitudeReading>,
    takeoff_delta_m: i64,
    reference_offset_m: i64,
}

impl Default for TakeoffDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl TakeoffDetector {
    /// Creates a detector with the default threshold (1 m) and reference
    /// offset (−1 m).
    #[must_use]
    pub fn new() -> Self {
        Self::with_tuning(TAKEOFF_DETECT_DELTA_M, REFERENCE_OFFSET_M)
    }

    /// Creates a detector with explicit detection tuning.
    ///
    /// # Arguments
    ///
    /// * `takeoff_delta_m` - Delta that must be strictly exceeded to fire
    /// * `reference_offset_m` - Offset added to the captured reference altitude
    #[must_use]
    pub fn with_tuning(takeoff_delta_m: i64, reference_offset_m: i64) -> Self {
        Self {
            phase: Phase::Uninitialized,
            reading: None,
            takeoff_delta_m,
            reference_offset_m,
        }
    }

    /// Process one pressure sample.
    ///
    /// The first valid sample captures the reference state and transitions the
    /// detector to `Armed`; it produces a reading but can never fire. Each
    /// later sample updates the reading and, while `Armed`, is checked against
    /// the takeoff threshold.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPressure`](crate::error::FlightVoiceError::InvalidPressure)
    /// for pressures the barometric formula is undefined for. A rejected
    /// sample leaves the detector state and the last reading untouched — the
    /// caller simply skips it and awaits the next.
    pub fn process_sample(&mut self, sample: &PressureSample) -> Result<SampleOutcome> {
        let altitude_m = converter::round_to_meters(converter::altitude_amsl(sample.pressure_hpa)?);

        let (reading, event) = match self.phase {
            Phase::Uninitialized => {
                let reference = ReferenceState {
                    reference_pressure_hpa: sample.pressure_hpa,
                    reference_altitude_m: altitude_m + self.reference_offset_m,
                };
                debug!(
                    "Reference captured: {} m AMSL at {} hPa",
                    reference.reference_altitude_m, reference.reference_pressure_hpa
                );
                self.phase = Phase::Armed { reference };
                (self.derive_reading(altitude_m, sample, &reference), None)
            }
            Phase::Armed { reference } => {
                let reading = self.derive_reading(altitude_m, sample, &reference);
                if reading.altitude_delta_m > self.takeoff_delta_m {
                    let event = TakeoffEvent {
                        detected_at_epoch_ms: sample
                            .captured_at_epoch_ms
                            .unwrap_or_else(|| Utc::now().timestamp_millis()),
                        reference_altitude_m: reference.reference_altitude_m,
                    };
                    debug!(
                        "Takeoff detected: {} m above reference",
                        reading.altitude_delta_m
                    );
                    self.phase = Phase::Fired { reference };
                    (reading, Some(event))
                } else {
                    (reading, None)
                }
            }
            // Terminal: keep the reading current, never fire again
            Phase::Fired { reference } => (self.derive_reading(altitude_m, sample, &reference), None),
        };

        self.reading = Some(reading);
        Ok(SampleOutcome { reading, event })
    }

    /// Read-only snapshot of the detector's current state.
    #[must_use]
    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            reference: self.reference(),
            reading: self.reading,
            fired: matches!(self.phase, Phase::Fired { .. }),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> DetectorState {
        match self.phase {
            Phase::Uninitialized => DetectorState::Uninitialized,
            Phase::Armed { .. } => DetectorState::Armed,
            Phase::Fired { .. } => DetectorState::Fired,
        }
    }

    /// The captured reference, `None` before the first sample.
    #[must_use]
    pub fn reference(&self) -> Option<ReferenceState> {
        match self.phase {
            Phase::Uninitialized => None,
            Phase::Armed { reference } | Phase::Fired { reference } => Some(reference),
        }
    }

    fn derive_reading(
        &self,
        altitude_m: i64,
        sample: &PressureSample,
        reference: &ReferenceState,
    ) -> AltitudeReading {
        AltitudeReading {
            altitude_amsl_m: altitude_m,
            altitude_delta_m: altitude_m - reference.reference_altitude_m,
            source_pressure_hpa: sample.pressure_hpa,
        }
    }
}
