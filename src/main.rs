//! # FlightVoice
//!
//! Voice-announced takeoff detection from a barometric pressure sensor.
//!
//! This application converts barometric pressure into altitude, captures a
//! reference ("takeoff") altitude from the first reading, and speaks a
//! one-time announcement the moment the measured altitude climbs meaningfully
//! above that reference.

use std::path::Path;

use anyhow::Result;
use chrono::{Local, TimeZone};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_subscriber;

mod config;
mod error;
mod altitude;
mod barometer;
mod announcer;

use altitude::detector::{DetectorSnapshot, TakeoffDetector, TakeoffEvent};
use announcer::{Announcer, SpeechAnnouncer};
use barometer::{IioBarometer, PressureSource, Subscription};
use config::Config;

/// Default configuration file path, relative to the working directory
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the FlightVoice application
///
/// Initializes the application and runs the main sampling loop that reads the
/// barometer at the configured interval and feeds the takeoff detector.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (CLI path argument, `config/default.toml`, or
///      built-in defaults)
///    - Discover the IIO pressure sensor
///
/// 2. **Main Loop**
///    - Read one pressure sample per interval tick while subscribed
///    - Convert to altitude and run takeoff detection
///    - On the (single) takeoff event: log a structured record and speak the
///      announcement
///    - Log a status line every N samples
///    - SIGUSR1 toggles barometer updates on/off
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C stops sampling
///    - Log total sample count and detection outcome
///
/// # Errors
///
/// Returns error if:
/// - Configuration is present but invalid
/// - No barometric pressure sensor is found
///
/// Individual sensor read failures and malformed samples are logged and
/// skipped; they never terminate the loop.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("FlightVoice v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = if Path::new(&config_path).exists() {
        let config = Config::load(&config_path)?;
        info!("Configuration loaded from {}", config_path);
        config
    } else {
        info!("No configuration file at {}, using defaults", config_path);
        Config::default()
    };

    // Discover the pressure sensor
    let mut barometer = IioBarometer::discover_in(Path::new(&config.barometer.device_dir))?;
    info!("Barometer ready: {}", barometer.describe());

    let mut announcer = SpeechAnnouncer::from_config(&config.announcer);
    let mut detector = TakeoffDetector::with_tuning(
        config.detection.takeoff_delta_m,
        config.detection.reference_offset_m,
    );
    let mut subscription = Subscription::new();

    let mut sample_interval = interval(Duration::from_millis(config.barometer.sample_interval_ms));
    let mut toggle_signal = signal(SignalKind::user_defined1())?;

    info!(
        "Sampling every {} ms, takeoff threshold {} m (SIGUSR1 toggles barometer updates)",
        config.barometer.sample_interval_ms, config.detection.takeoff_delta_m
    );
    info!("Press Ctrl+C to exit");

    let mut sample_count: u64 = 0;
    let mut takeoff: Option<TakeoffEvent> = None;

    // Main sampling loop
    loop {
        tokio::select! {
            // Read and process one sample per tick
            _ = sample_interval.tick() => {
                if !subscription.is_active() {
                    continue;
                }

                let sample = match barometer.read_sample().await {
                    Ok(sample) => sample,
                    Err(e) => {
                        warn!("Barometer read failed: {}", e);
                        continue;
                    }
                };

                let outcome = match detector.process_sample(&sample) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        debug!("Discarding sample: {}", e);
                        continue;
                    }
                };
                sample_count += 1;

                if let Some(event) = outcome.event {
                    info!(
                        "Takeoff detected: {}",
                        serde_json::to_string(&event).unwrap_or_default()
                    );
                    takeoff = Some(event);

                    if config.announcer.enabled {
                        if let Err(e) = announcer.announce(&event).await {
                            warn!("Announcement failed: {}", e);
                        }
                    }
                }

                // Status line every N samples
                if sample_count % config.status.every_samples == 0 {
                    info!("{}", format_status(&detector.snapshot(), takeoff.as_ref()));
                }
            }

            // SIGUSR1 toggles barometer updates
            _ = toggle_signal.recv() => {
                let state = subscription.toggle();
                info!("Barometer updates toggled: {}", state.label());
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!(
                    "Processed {} samples, takeoff {}",
                    sample_count,
                    if detector.snapshot().fired { "detected" } else { "not detected" }
                );
                break;
            }
        }
    }

    Ok(())
}

/// Render the periodic status line from the detector snapshot.
fn format_status(snapshot: &DetectorSnapshot, takeoff: Option<&TakeoffEvent>) -> String {
    let takeoff_altitude = snapshot
        .reference
        .map(|r| r.reference_altitude_m.to_string())
        .unwrap_or_else(|| "-".to_string());

    let (current_altitude, delta, pressure) = match snapshot.reading {
        Some(reading) => (
            reading.altitude_amsl_m.to_string(),
            reading.altitude_delta_m.to_string(),
            format!("{:.2}", reading.source_pressure_hpa),
        ),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };

    format!(
        "Takeoff altitude: {} m AMSL | Takeoff time: {} | Current altitude: {} m AMSL | Altitude delta: {} m | Pressure: {} hPa",
        takeoff_altitude,
        format_takeoff_time(takeoff),
        current_altitude,
        delta,
        pressure,
    )
}

/// Local wall-clock time of the takeoff event, or "-" before detection.
fn format_takeoff_time(takeoff: Option<&TakeoffEvent>) -> String {
    takeoff
        .and_then(|event| Local.timestamp_millis_opt(event.detected_at_epoch_ms).single())
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
