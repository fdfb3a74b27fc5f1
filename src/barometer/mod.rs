//! # Barometer Module
//!
//! Barometric pressure acquisition.
//!
//! This module handles:
//! - The [`PressureSource`] trait the main loop consumes samples through
//! - Linux IIO sysfs barometer discovery and reading
//! - The explicit subscribed/unsubscribed stream controller
//!
//! Units are hectopascals end to end; the IIO backend converts from the
//! kilopascals reported by the kernel.

use async_trait::async_trait;

use crate::error::Result;

pub mod iio;
pub mod subscription;

pub use iio::IioBarometer;
pub use subscription::{Subscription, SubscriptionState};

/// A single barometric pressure reading.
///
/// Immutable once created. The capture timestamp is optional; sources that
/// cannot stamp samples leave it `None` and consumers fall back to the wall
/// clock where a timestamp is required.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureSample {
    /// Pressure in hectopascals.
    pub pressure_hpa: f64,
    /// Capture time in milliseconds since the Unix epoch, if known.
    pub captured_at_epoch_ms: Option<i64>,
}

impl PressureSample {
    /// Creates an unstamped sample.
    #[must_use]
    pub fn new(pressure_hpa: f64) -> Self {
        Self {
            pressure_hpa,
            captured_at_epoch_ms: None,
        }
    }

    /// Creates a sample stamped with a capture time in epoch milliseconds.
    #[must_use]
    pub fn stamped(pressure_hpa: f64, captured_at_epoch_ms: i64) -> Self {
        Self {
            pressure_hpa,
            captured_at_epoch_ms: Some(captured_at_epoch_ms),
        }
    }
}

/// Trait for pressure sample acquisition
///
/// The main loop pulls one sample per tick through this seam; tests substitute
/// a scripted source.
#[async_trait]
pub trait PressureSource: Send {
    /// Read the next pressure sample from the sensor
    async fn read_sample(&mut self) -> Result<PressureSample>;

    /// Human-readable description of the source, for logging
    fn describe(&self) -> String;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::FlightVoiceError;
    use std::collections::VecDeque;

    /// Scripted pressure source for testing
    pub struct ScriptedSource {
        samples: VecDeque<Result<PressureSample>>,
    }

    impl ScriptedSource {
        pub fn new(samples: Vec<Result<PressureSample>>) -> Self {
            Self {
                samples: samples.into(),
            }
        }

        pub fn from_pressures(pressures: &[f64]) -> Self {
            Self::new(
                pressures
                    .iter()
                    .map(|&p| Ok(PressureSample::new(p)))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl PressureSource for ScriptedSource {
        async fn read_sample(&mut self) -> Result<PressureSample> {
            self.samples
                .pop_front()
                .unwrap_or_else(|| Err(FlightVoiceError::Barometer("script exhausted".to_string())))
        }

        fn describe(&self) -> String {
            "scripted source".to_string()
        }
    }

    #[tokio::test]
    async fn test_scripted_source_replays_in_order() {
        let mut source = ScriptedSource::from_pressures(&[1013.25, 1012.0]);
        assert_eq!(source.read_sample().await.unwrap().pressure_hpa, 1013.25);
        assert_eq!(source.read_sample().await.unwrap().pressure_hpa, 1012.0);
        assert!(source.read_sample().await.is_err());
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::ScriptedSource;
    use super::*;
    use crate::altitude::converter::pressure_at_altitude;
    use crate::altitude::detector::TakeoffDetector;
    use crate::error::FlightVoiceError;

    #[tokio::test]
    async fn test_pipeline_skips_failures_and_fires_once() {
        // The main loop's contract: read failures and invalid samples are
        // skipped, valid samples flow into the detector in arrival order.
        let mut source = ScriptedSource::new(vec![
            Ok(PressureSample::new(pressure_at_altitude(0.0))),
            Err(FlightVoiceError::Barometer("bus glitch".to_string())),
            Ok(PressureSample::new(-3.0)),
            Ok(PressureSample::new(pressure_at_altitude(0.4))),
            Ok(PressureSample::new(pressure_at_altitude(8.0))),
            Ok(PressureSample::new(pressure_at_altitude(12.0))),
        ]);

        let mut detector = TakeoffDetector::new();
        let mut events = 0;
        for _ in 0..6 {
            let sample = match source.read_sample().await {
                Ok(sample) => sample,
                Err(_) => continue,
            };
            let outcome = match detector.process_sample(&sample) {
                Ok(outcome) => outcome,
                Err(_) => continue,
            };
            if outcome.event.is_some() {
                events += 1;
            }
        }

        assert_eq!(events, 1);
        assert!(detector.snapshot().fired);
        assert_eq!(detector.snapshot().reading.unwrap().altitude_amsl_m, 12);
    }

    #[test]
    fn test_new_sample_is_unstamped() {
        let sample = PressureSample::new(1013.25);
        assert_eq!(sample.pressure_hpa, 1013.25);
        assert_eq!(sample.captured_at_epoch_ms, None);
    }

    #[test]
    fn test_stamped_sample_carries_timestamp() {
        let sample = PressureSample::stamped(1000.0, 1_700_000_000_000);
        assert_eq!(sample.captured_at_epoch_ms, Some(1_700_000_000_000));
    }
}
