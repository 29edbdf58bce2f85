//! Output row schema and formatting
//!
//! Every datalog starts with a session-metadata row, a column-name row, and
//! a unit-tag row; each timer tick then appends one data row in the fixed
//! column order below. Lap-timing-enabled sessions append the lap statistics
//! columns to every row.

use chrono::Local;
use otl_core::{Channel, SnapshotReading};
use otl_ecu::EcuVariant;

use crate::config::Settings;

/// Columns always present, in order.
const BASE_NAMES: [&str; 31] = [
    "Time",
    "Engine RPM",
    "Speed",
    "Gear",
    "Voltage",
    "IAT",
    "ECT",
    "TPS",
    "MAP",
    "INJ",
    "IGN",
    "Lambda Ratio",
    "Knock Count",
    "Target Cam Angle",
    "Actual Cam Angle",
    "Analog0",
    "Analog1",
    "Analog2",
    "Analog3",
    "Analog4",
    "Analog5",
    "Analog6",
    "Analog7",
    "Ethanol Input1",
    "Ethanol Input2",
    "Ethanol Input3",
    "Latitude",
    "Longitude",
    "SessionTimeMs",
    "LapIndex",
    "LapStartTimeMs",
];

const BASE_UNITS: [&str; 31] = [
    "sec", "rpm", "km/h", "", "V", "C", "C", "%", "kPa", "ms", "deg", "lambda", "count", "deg",
    "deg", "", "", "", "", "", "", "", "", "hz", "%", "%", "deg", "deg", "ms", "int", "ms",
];

/// Extra columns appended when lap timing is enabled.
const LAP_NAMES: [&str; 7] = [
    "LapCount",
    "CurrentTimeMs",
    "CurrentLapStartMs",
    "CurrentLapTimeMs",
    "BestLapTimeMs",
    "PersonalBestLapTimeMs",
    "PreviousLapTimeMs",
];

const LAP_UNITS: [&str; 7] = ["int", "ms", "ms", "ms", "ms", "ms", "ms"];

/// Session metadata header: timestamp, track, vehicle, ECU variant.
pub fn metadata_row(settings: &Settings) -> Vec<String> {
    vec![
        Local::now().format("%d-%m-%Y - %H:%M:%S").to_string(),
        settings.track.clone(),
        settings.car.to_string(),
        settings.ecu.to_string(),
    ]
}

pub fn column_names(lap_timing: bool) -> Vec<String> {
    header(&BASE_NAMES, &LAP_NAMES, lap_timing)
}

pub fn unit_tags(lap_timing: bool) -> Vec<String> {
    header(&BASE_UNITS, &LAP_UNITS, lap_timing)
}

fn header(base: &[&str], lap: &[&str], lap_timing: bool) -> Vec<String> {
    let mut row: Vec<String> = base.iter().map(|s| s.to_string()).collect();
    if lap_timing {
        row.extend(lap.iter().map(|s| s.to_string()));
    }
    row
}

/// Elapsed sampler time as seconds.decisecond ("00.0", "12.3").
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let seconds = elapsed_ms / 1000;
    let fraction = (elapsed_ms % 1000) / 100;
    format!("{seconds:02}.{fraction}")
}

/// One data row from a snapshot reading.
pub fn data_row(
    reading: &SnapshotReading,
    elapsed_ms: u64,
    ecu: EcuVariant,
    lap_timing: bool,
) -> Vec<String> {
    let unsigned = |ch: Channel| reading.value(ch).as_u64().to_string();
    let signed = |ch: Channel| reading.value(ch).as_i64().to_string();

    // Ethanol input 2 is a duty percentage on S300 and a content byte on
    // K-Pro; the rendering follows the configured variant, not the value.
    let ethanol_input2 = match ecu {
        EcuVariant::S300 => format!("{:.2}", reading.value(Channel::EthanolInput2).as_f64()),
        EcuVariant::KPro => unsigned(Channel::EthanolInput2),
    };

    let mut row = vec![
        format_elapsed(elapsed_ms),
        unsigned(Channel::Rpm),
        unsigned(Channel::Speed),
        unsigned(Channel::Gear),
        format!("{:.1}", reading.value(Channel::Voltage).as_f64()),
        unsigned(Channel::Iat),
        unsigned(Channel::Ect),
        unsigned(Channel::Tps),
        unsigned(Channel::Map),
        unsigned(Channel::Inj),
        unsigned(Channel::Ign),
        format!("{:.2}", reading.value(Channel::Lambda).as_f64()),
        unsigned(Channel::KnockCount),
        format!("{:.2}", reading.value(Channel::CamAngleTarget).as_f64()),
        format!("{:.2}", reading.value(Channel::CamAngleActual).as_f64()),
        signed(Channel::Analog0),
        signed(Channel::Analog1),
        unsigned(Channel::Analog2),
        unsigned(Channel::Analog3),
        unsigned(Channel::Analog4),
        unsigned(Channel::Analog5),
        unsigned(Channel::Analog6),
        unsigned(Channel::Analog7),
        unsigned(Channel::EthanolInput1),
        ethanol_input2,
        unsigned(Channel::EthanolInput3),
        format!("{:.10}", reading.latitude()),
        format!("{:.10}", reading.longitude()),
        reading.lap.session_time_ms.to_string(),
        reading.lap.lap_index.to_string(),
        reading.lap.lap_start_ms.to_string(),
    ];

    if lap_timing {
        row.push(reading.lap.lap_index.to_string());
        row.push(reading.lap.session_time_ms.to_string());
        row.push(reading.lap.lap_start_ms.to_string());
        row.push(reading.lap.current_lap_ms().to_string());
        row.push(reading.lap.best_lap_ms.to_string());
        row.push(reading.lap.personal_best_ms.to_string());
        row.push(reading.lap.previous_lap_ms.to_string());
    }

    row
}
