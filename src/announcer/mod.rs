//! # Announcer Module
//!
//! Speech output sink for the takeoff event.
//!
//! This module handles:
//! - The [`Announcer`] trait the main loop delivers events through
//! - Spawning an external text-to-speech command (`espeak` by default)
//! - Mapping the configured speech rate and volume onto the command's
//!   speed and amplitude flags
//!
//! Delivery is best-effort: the core guarantees the event is produced at most
//! once, and a failed announcement is reported to the caller without retry.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::altitude::detector::TakeoffEvent;
use crate::config::AnnouncerConfig;
use crate::error::{FlightVoiceError, Result};

/// Default text-to-speech command.
pub const DEFAULT_TTS_COMMAND: &str = "espeak";

/// Default speech rate, normalized 0..1 (0.33 reads slowly and clearly).
pub const DEFAULT_SPEECH_RATE: f64 = 0.33;

/// Default volume, 1..100.
pub const DEFAULT_VOLUME: u32 = 100;

/// espeak speed range in words per minute.
const ESPEAK_MAX_WPM: f64 = 450.0;
const ESPEAK_MIN_WPM: u32 = 80;

/// Trait for takeoff event delivery
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Announcer: Send {
    /// Deliver one takeoff event to the user
    async fn announce(&mut self, event: &TakeoffEvent) -> Result<()>;
}

/// Speech announcer spawning an external TTS command per event.
#[derive(Debug, Clone)]
pub struct SpeechAnnouncer {
    /// TTS command to spawn (e.g. "espeak").
    command: String,
    /// Speech rate, normalized 0..1.
    speech_rate: f64,
    /// Volume, 1..100.
    volume: u32,
}

impl Default for SpeechAnnouncer {
    fn default() -> Self {
        Self::new(DEFAULT_TTS_COMMAND, DEFAULT_SPEECH_RATE, DEFAULT_VOLUME)
    }
}

impl SpeechAnnouncer {
    /// Creates an announcer with explicit settings.
    ///
    /// # Arguments
    ///
    /// * `command` - TTS command name or path
    /// * `speech_rate` - Normalized rate, 0..1 (clamped)
    /// * `volume` - Volume, 1..100 (clamped)
    #[must_use]
    pub fn new(command: &str, speech_rate: f64, volume: u32) -> Self {
        Self {
            command: command.to_string(),
            speech_rate: speech_rate.clamp(0.05, 1.0),
            volume: volume.clamp(1, 100),
        }
    }

    /// Creates an announcer from the `[announcer]` configuration section.
    #[must_use]
    pub fn from_config(config: &AnnouncerConfig) -> Self {
        Self::new(&config.command, config.speech_rate, config.volume)
    }

    /// The spoken announcement for a takeoff event.
    #[must_use]
    pub fn message_for(event: &TakeoffEvent) -> String {
        format!(
            "FlightVoice takeoff, altitude {} meters, have an amazing flight !",
            event.reference_altitude_m
        )
    }

    /// Speech rate mapped onto espeak's words-per-minute scale.
    fn speed_wpm(&self) -> u32 {
        ((self.speech_rate * ESPEAK_MAX_WPM) as u32).max(ESPEAK_MIN_WPM)
    }

    /// Volume mapped onto espeak's 0-200 amplitude scale.
    fn amplitude(&self) -> u32 {
        self.volume * 2
    }
}

#[async_trait]
impl Announcer for SpeechAnnouncer {
    async fn announce(&mut self, event: &TakeoffEvent) -> Result<()> {
        let message = Self::message_for(event);
        debug!("Announcing: {}", message);

        let status = Command::new(&self.command)
            .arg("-s")
            .arg(self.speed_wpm().to_string())
            .arg("-a")
            .arg(self.amplitude().to_string())
            .arg(&message)
            .status()
            .await
            .map_err(|e| {
                FlightVoiceError::Announcer(format!("Failed to spawn '{}': {}", self.command, e))
            })?;

        if !status.success() {
            return Err(FlightVoiceError::Announcer(format!(
                "'{}' exited with {}",
                self.command, status
            )));
        }

        debug!("Announcement delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::altitude::converter::pressure_at_altitude;
    use crate::altitude::detector::TakeoffDetector;
    use crate::barometer::PressureSample;

    fn event_at_reference(reference_altitude_m: i64) -> TakeoffEvent {
        TakeoffEvent {
            detected_at_epoch_ms: 1_700_000_000_000,
            reference_altitude_m,
        }
    }

    // ==================== Message Tests ====================

    #[test]
    fn test_message_wording_is_exact() {
        let message = SpeechAnnouncer::message_for(&event_at_reference(-1));
        assert_eq!(
            message,
            "FlightVoice takeoff, altitude -1 meters, have an amazing flight !"
        );
    }

    #[test]
    fn test_message_carries_reference_altitude() {
        let message = SpeechAnnouncer::message_for(&event_at_reference(523));
        assert!(message.contains("altitude 523 meters"));
    }

    // ==================== Mapping Tests ====================

    #[test]
    fn test_default_speed_maps_to_espeak_wpm() {
        let announcer = SpeechAnnouncer::default();
        // 0.33 * 450 = 148 wpm
        assert_eq!(announcer.speed_wpm(), 148);
    }

    #[test]
    fn test_slow_rate_clamps_to_minimum_wpm() {
        let announcer = SpeechAnnouncer::new(DEFAULT_TTS_COMMAND, 0.05, DEFAULT_VOLUME);
        assert_eq!(announcer.speed_wpm(), ESPEAK_MIN_WPM);
    }

    #[test]
    fn test_full_volume_maps_to_full_amplitude() {
        let announcer = SpeechAnnouncer::default();
        assert_eq!(announcer.amplitude(), 200);
    }

    #[test]
    fn test_out_of_range_settings_are_clamped() {
        let announcer = SpeechAnnouncer::new(DEFAULT_TTS_COMMAND, 2.0, 500);
        assert_eq!(announcer.speed_wpm(), 450);
        assert_eq!(announcer.amplitude(), 200);
    }

    // ==================== Delivery Tests ====================

    #[tokio::test]
    async fn test_announce_with_succeeding_command() {
        // `true` accepts the arguments and exits 0 without speaking
        let mut announcer = SpeechAnnouncer::new("true", DEFAULT_SPEECH_RATE, DEFAULT_VOLUME);
        assert!(announcer.announce(&event_at_reference(-1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_announce_with_failing_command() {
        let mut announcer = SpeechAnnouncer::new("false", DEFAULT_SPEECH_RATE, DEFAULT_VOLUME);
        let result = announcer.announce(&event_at_reference(-1)).await;
        assert!(matches!(result, Err(FlightVoiceError::Announcer(_))));
    }

    #[tokio::test]
    async fn test_announce_with_missing_command() {
        let mut announcer = SpeechAnnouncer::new(
            "/nonexistent/tts-command-12345",
            DEFAULT_SPEECH_RATE,
            DEFAULT_VOLUME,
        );
        let result = announcer.announce(&event_at_reference(-1)).await;
        assert!(matches!(result, Err(FlightVoiceError::Announcer(_))));
    }

    // ==================== Exactly-Once Integration ====================

    #[tokio::test]
    async fn test_mock_announcer_sees_exactly_one_event() {
        let mut mock = MockAnnouncer::new();
        mock.expect_announce().times(1).returning(|_| Ok(()));

        let mut detector = TakeoffDetector::new();
        // Climb through the threshold and keep climbing: one announcement only
        for altitude in [0.0, 0.4, 3.0, 8.0, 15.0] {
            let sample = PressureSample::new(pressure_at_altitude(altitude));
            let outcome = detector.process_sample(&sample).unwrap();
            if let Some(event) = outcome.event {
                mock.announce(&event).await.unwrap();
            }
        }
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TTS_COMMAND, "espeak");
        assert_eq!(DEFAULT_SPEECH_RATE, 0.33);
        assert_eq!(DEFAULT_VOLUME, 100);
    }
}
