//! Settings-file loading

use anyhow::{bail, Context, Result};
use otl_ecu::{EcuVariant, Vehicle};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_PATH: &str = "otl-settings.json";

/// Logger configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Sample rows per second (5/10/20 Hz in the usual configurations).
    pub logging_hertz: u32,
    /// CAN interface name, e.g. "can0".
    pub can_channel: String,
    pub car: Vehicle,
    pub ecu: EcuVariant,
    pub track: String,
    pub lap_timing: bool,
    /// Out-of-band control frame that ends ingestion.
    #[serde(default = "default_stop_frame_id")]
    pub stop_frame_id: u32,
    #[serde(default = "default_gpsd_address")]
    pub gpsd_address: String,
    /// Directory receiving datalog CSVs and the personal-best store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_stop_frame_id() -> u32 {
    104
}

fn default_gpsd_address() -> String {
    "localhost:2947".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&data)
            .with_context(|| format!("cannot parse settings file {}", path.display()))?;
        if settings.logging_hertz == 0 {
            bail!("loggingHertz must be at least 1");
        }
        Ok(settings)
    }

    /// Sampling period for the configured rate, floored at 1 ms.
    pub fn sample_period(&self) -> Duration {
        (Duration::from_secs(1) / self.logging_hertz).max(Duration::from_millis(1))
    }
}
