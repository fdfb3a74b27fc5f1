//! # Error Types
//!
//! Custom error types for FlightVoice using `thiserror`.

use thiserror::Error;

/// Main error type for FlightVoice
#[derive(Debug, Error)]
pub enum FlightVoiceError {
    /// Pressure reading unusable for altitude conversion (zero, negative, NaN, infinite)
    #[error("invalid pressure reading: {value} hPa")]
    InvalidPressure {
        /// The offending pressure value in hectopascals
        value: f64,
    },

    /// No barometric pressure channel found during device discovery
    #[error("no barometer found under {0}")]
    BarometerNotFound(String),

    /// Barometer read or parse failure on an individual sample
    #[error("barometer error: {0}")]
    Barometer(String),

    /// Speech announcement delivery failure
    #[error("announcer error: {0}")]
    Announcer(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FlightVoice
pub type Result<T> = std::result::Result<T, FlightVoiceError>;
