//! Built-in track registry
//!
//! Maps a settings track name to the circuit's bounding corners; the finish
//! line is the segment between the (min, min) and (max, max) corners.

use otl_core::FinishLine;
use serde::Deserialize;

/// Geographic bounding corners of a circuit, in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Track {
    pub lat_min: f64,
    pub lon_min: f64,
    pub lat_max: f64,
    pub lon_max: f64,
}

impl Track {
    pub fn finish_line(&self) -> FinishLine {
        FinishLine::from_bounds(self.lat_min, self.lon_min, self.lat_max, self.lon_max)
    }
}

/// Bounds for a configured track name.
///
/// Unknown names yield zero bounds: the degenerate finish line never reports
/// a crossing, so lap timing silently stays on lap 0.
pub fn bounds_for(name: &str) -> Track {
    match name {
        "smsp" | "eastern-creek" => Track {
            lat_min: -33.8045,
            lon_min: 150.8670,
            lat_max: -33.7985,
            lon_max: 150.8750,
        },
        "wakefield" | "one-raceway" => Track {
            lat_min: -34.8475,
            lon_min: 149.6835,
            lat_max: -34.8425,
            lon_max: 149.6895,
        },
        "phillip-island" => Track {
            lat_min: -38.5035,
            lon_min: 145.2280,
            lat_max: -38.4975,
            lon_max: 145.2440,
        },
        _ => {
            tracing::warn!(track = name, "unknown track, lap timing will stay on lap 0");
            Track::default()
        }
    }
}
