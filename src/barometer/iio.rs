//! # IIO Barometer Module
//!
//! Barometric pressure acquisition through the Linux Industrial I/O (IIO)
//! sysfs interface.
//!
//! ## Device Discovery
//!
//! Pressure sensors registered with the IIO subsystem appear as
//! `/sys/bus/iio/devices/iio:deviceN` directories. A device exposes its
//! processed pressure channel as the file `in_pressure_input`, reported in
//! kilopascals. Discovery scans the device directory in sorted order and
//! picks the first device carrying a pressure channel, so selection is
//! deterministic when several sensors are present.
//!
//! ## Units
//!
//! The kernel reports kilopascals; this module converts to hectopascals
//! (1 kPa = 10 hPa), the unit used throughout the crate.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::barometer::{PressureSample, PressureSource};
use crate::error::{FlightVoiceError, Result};

/// Default IIO device directory on Linux.
pub const DEFAULT_IIO_DIR: &str = "/sys/bus/iio/devices";

/// Processed pressure channel file name, value in kilopascals.
const PRESSURE_CHANNEL_FILE: &str = "in_pressure_input";

/// Device name file, e.g. "bmp280".
const NAME_FILE: &str = "name";

/// Conversion factor from kilopascals (IIO) to hectopascals.
const KPA_TO_HPA: f64 = 10.0;

/// Barometer handle over an IIO pressure channel.
///
/// Holds the path of the discovered channel file and re-reads it for every
/// sample.
#[derive(Debug)]
pub struct IioBarometer {
    /// Path of the `in_pressure_input` channel file.
    channel_path: PathBuf,
    /// Sensor name reported by the driver, for logging.
    device_name: String,
}

impl IioBarometer {
    /// Discover the first IIO pressure sensor on the system.
    ///
    /// # Errors
    ///
    /// Returns [`FlightVoiceError::BarometerNotFound`] if no device under
    /// [`DEFAULT_IIO_DIR`] exposes a pressure channel.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use flight_voice::barometer::IioBarometer;
    ///
    /// let barometer = IioBarometer::discover()?;
    /// # Ok::<(), flight_voice::error::FlightVoiceError>(())
    /// ```
    pub fn discover() -> Result<Self> {
        Self::discover_in(Path::new(DEFAULT_IIO_DIR))
    }

    /// Discover the first pressure sensor under a specific device directory.
    ///
    /// # Arguments
    ///
    /// * `device_dir` - Directory containing `iio:deviceN` entries
    ///
    /// # Errors
    ///
    /// Returns [`FlightVoiceError::BarometerNotFound`] if the directory is
    /// missing or no device in it exposes `in_pressure_input`.
    pub fn discover_in(device_dir: &Path) -> Result<Self> {
        if !device_dir.exists() {
            return Err(FlightVoiceError::BarometerNotFound(
                device_dir.display().to_string(),
            ));
        }

        let mut entries: Vec<_> = std::fs::read_dir(device_dir)
            .map_err(|e| {
                FlightVoiceError::Barometer(format!(
                    "Failed to read {}: {}",
                    device_dir.display(),
                    e
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                FlightVoiceError::Barometer(format!("Failed to read directory entry: {}", e))
            })?;

        // Sort entries for deterministic device selection when multiple sensors are present
        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            // Only check iio:device* entries
            if let Some(filename) = path.file_name() {
                if !filename.to_string_lossy().starts_with("iio:device") {
                    continue;
                }
            } else {
                continue;
            }

            let channel_path = path.join(PRESSURE_CHANNEL_FILE);
            debug!("Probing IIO device: {}", path.display());

            if channel_path.is_file() {
                let device_name = std::fs::read_to_string(path.join(NAME_FILE))
                    .map(|name| name.trim().to_string())
                    .unwrap_or_else(|_| "unknown".to_string());

                info!(
                    "Found pressure sensor '{}' at {}",
                    device_name,
                    path.display()
                );

                return Ok(Self {
                    channel_path,
                    device_name,
                });
            }
        }

        Err(FlightVoiceError::BarometerNotFound(
            device_dir.display().to_string(),
        ))
    }

    /// Read the pressure channel once, in hectopascals.
    fn read_pressure_hpa(&self) -> Result<f64> {
        let raw = std::fs::read_to_string(&self.channel_path).map_err(|e| {
            FlightVoiceError::Barometer(format!(
                "Failed to read {}: {}",
                self.channel_path.display(),
                e
            ))
        })?;

        let kpa: f64 = raw.trim().parse().map_err(|e| {
            FlightVoiceError::Barometer(format!(
                "Failed to parse pressure value '{}': {}",
                raw.trim(),
                e
            ))
        })?;

        Ok(kpa * KPA_TO_HPA)
    }
}

#[async_trait]
impl PressureSource for IioBarometer {
    async fn read_sample(&mut self) -> Result<PressureSample> {
        let pressure_hpa = self.read_pressure_hpa()?;
        debug!("Read pressure sample: {:.2} hPa", pressure_hpa);

        Ok(PressureSample::stamped(
            pressure_hpa,
            Utc::now().timestamp_millis(),
        ))
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.device_name, self.channel_path.display())
    }
}
