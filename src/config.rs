//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub barometer: BarometerConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub announcer: AnnouncerConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Barometer acquisition configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BarometerConfig {
    /// Directory scanned for IIO pressure devices.
    #[serde(default = "default_device_dir")]
    pub device_dir: String,

    /// Interval between pressure samples, in milliseconds.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

/// Takeoff detection configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DetectionConfig {
    /// Altitude delta that must be strictly exceeded to fire, in meters.
    #[serde(default = "default_takeoff_delta_m")]
    pub takeoff_delta_m: i64,

    /// Offset applied to the captured reference altitude, in meters.
    #[serde(default = "default_reference_offset_m")]
    pub reference_offset_m: i64,
}

/// Speech announcer configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AnnouncerConfig {
    /// Whether the takeoff event is announced at all.
    #[serde(default = "default_announcer_enabled")]
    pub enabled: bool,

    /// Text-to-speech command to spawn.
    #[serde(default = "default_tts_command")]
    pub command: String,

    /// Speech rate, normalized 0..1.
    #[serde(default = "default_speech_rate")]
    pub speech_rate: f64,

    /// Volume, 1..100.
    #[serde(default = "default_volume")]
    pub volume: u32,
}

/// Status reporting configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    /// Emit a status log line every N processed samples.
    #[serde(default = "default_status_every_samples")]
    pub every_samples: u64,
}

// Default value functions
fn default_device_dir() -> String { "/sys/bus/iio/devices".to_string() }
fn default_sample_interval_ms() -> u64 { 200 }

fn default_takeoff_delta_m() -> i64 { 1 }
fn default_reference_offset_m() -> i64 { -1 }

fn default_announcer_enabled() -> bool { true }
fn default_tts_command() -> String { "espeak".to_string() }
fn default_speech_rate() -> f64 { 0.33 }
fn default_volume() -> u32 { 100 }

fn default_status_every_samples() -> u64 { 25 }

impl Default for BarometerConfig {
    fn default() -> Self {
        Self {
            device_dir: default_device_dir(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            takeoff_delta_m: default_takeoff_delta_m(),
            reference_offset_m: default_reference_offset_m(),
        }
    }
}

impl Default for AnnouncerConfig {
    fn default() -> Self {
        Self {
            enabled: default_announcer_enabled(),
            command: default_tts_command(),
            speech_rate: default_speech_rate(),
            volume: default_volume(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            every_samples: default_status_every_samples(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            barometer: BarometerConfig::default(),
            detection: DetectionConfig::default(),
            announcer: AnnouncerConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flight_voice::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.barometer.device_dir.is_empty() {
            return Err(crate::error::FlightVoiceError::Config(
                toml::de::Error::custom("barometer device_dir cannot be empty")
            ));
        }

        if self.barometer.sample_interval_ms < 10 || self.barometer.sample_interval_ms > 60000 {
            return Err(crate::error::FlightVoiceError::Config(
                toml::de::Error::custom("sample_interval_ms must be between 10 and 60000")
            ));
        }

        if self.detection.takeoff_delta_m < 1 || self.detection.takeoff_delta_m > 100 {
            return Err(crate::error::FlightVoiceError::Config(
                toml::de::Error::custom("takeoff_delta_m must be between 1 and 100")
            ));
        }

        if self.detection.reference_offset_m < -10 || self.detection.reference_offset_m > 0 {
            return Err(crate::error::FlightVoiceError::Config(
                toml::de::Error::custom("reference_offset_m must be between -10 and 0")
            ));
        }

        if self.announcer.enabled && self.announcer.command.is_empty() {
            return Err(crate::error::FlightVoiceError::Config(
                toml::de::Error::custom("announcer command cannot be empty when enabled")
            ));
        }

        if self.announcer.speech_rate <= 0.0 || self.announcer.speech_rate > 1.0 {
            return Err(crate::error::FlightVoiceError::Config(
                toml::de::Error::custom("speech_rate must be greater than 0.0 and at most 1.0")
            ));
        }

        if self.announcer.volume < 1 || self.announcer.volume > 100 {
            return Err(crate::error::FlightVoiceError::Config(
                toml::de::Error::custom("volume must be between 1 and 100")
            ));
        }

        if self.status.every_samples == 0 {
            return Err(crate::error::FlightVoiceError::Config(
                toml::de::Error::custom("status every_samples must be greater than 0")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[barometer]
sample_interval_ms = 500

[detection]

[announcer]
command = "espeak-ng"

[status]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.barometer.sample_interval_ms, 500);
        assert_eq!(config.announcer.command, "espeak-ng");
        // Unspecified fields fall back to defaults
        assert_eq!(config.detection.takeoff_delta_m, 1);
        assert_eq!(config.status.every_samples, 25);
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"").unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.barometer.device_dir, "/sys/bus/iio/devices");
        assert!(config.announcer.enabled);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Config::load("/nonexistent/flight-voice.toml").is_err());
    }

    #[test]
    fn test_empty_device_dir() {
        let mut config = create_valid_config();
        config.barometer.device_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_interval_too_low() {
        let mut config = create_valid_config();
        config.barometer.sample_interval_ms = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_interval_too_high() {
        let mut config = create_valid_config();
        config.barometer.sample_interval_ms = 60001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_takeoff_delta_zero() {
        let mut config = create_valid_config();
        config.detection.takeoff_delta_m = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_takeoff_delta_too_high() {
        let mut config = create_valid_config();
        config.detection.takeoff_delta_m = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reference_offset_too_low() {
        let mut config = create_valid_config();
        config.detection.reference_offset_m = -11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reference_offset_positive() {
        let mut config = create_valid_config();
        config.detection.reference_offset_m = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_command_when_enabled() {
        let mut config = create_valid_config();
        config.announcer.enabled = true;
        config.announcer.command = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_command_when_disabled() {
        let mut config = create_valid_config();
        config.announcer.enabled = false;
        config.announcer.command = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_speech_rate_zero() {
        let mut config = create_valid_config();
        config.announcer.speech_rate = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speech_rate_too_high() {
        let mut config = create_valid_config();
        config.announcer.speech_rate = 1.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_volume_zero() {
        let mut config = create_valid_config();
        config.announcer.volume = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_volume_too_high() {
        let mut config = create_valid_config();
        config.announcer.volume = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_status_every_samples_zero() {
        let mut config = create_valid_config();
        config.status.every_samples = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_device_dir(), "/sys/bus/iio/devices");
        assert_eq!(default_sample_interval_ms(), 200);
        assert_eq!(default_takeoff_delta_m(), 1);
        assert_eq!(default_reference_offset_m(), -1);
        assert_eq!(default_announcer_enabled(), true);
        assert_eq!(default_tts_command(), "espeak");
        assert_eq!(default_speech_rate(), 0.33);
        assert_eq!(default_volume(), 100);
        assert_eq!(default_status_every_samples(), 25);
    }
}
