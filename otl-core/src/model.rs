//! Telemetry data model
//!
//! Defines the closed set of logged channels, the tagged value type decoded
//! from bus frames, and the small records exchanged between the decoder, the
//! lap-timing engine, and the sampler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of named channels in [`Channel`].
pub const CHANNEL_COUNT: usize = 25;

/// A named physical quantity derived from the vehicle bus.
///
/// The set is closed: one snapshot slot exists per variant, overwritten in
/// place whenever a matching frame arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Engine speed (rpm).
    Rpm,
    /// Vehicle speed (km/h).
    Speed,
    /// Selected gear.
    Gear,
    /// Battery voltage (V).
    Voltage,
    /// Intake air temperature (°C).
    Iat,
    /// Engine coolant temperature (°C).
    Ect,
    /// Throttle position (raw sensor value, 0xFFFF clamps to 0).
    Tps,
    /// Manifold absolute pressure (kPa).
    Map,
    /// Injector pulse width (ms).
    Inj,
    /// Ignition advance (degrees).
    Ign,
    /// Lambda ratio.
    Lambda,
    /// Knock event counter.
    KnockCount,
    /// Commanded cam angle (degrees).
    CamAngleTarget,
    /// Measured cam angle (degrees).
    CamAngleActual,
    /// Analog input 0 (wired to oil temperature, °C).
    Analog0,
    /// Analog input 1 (wired to oil pressure, psi).
    Analog1,
    Analog2,
    Analog3,
    Analog4,
    Analog5,
    Analog6,
    Analog7,
    /// Ethanol sensor frequency input.
    EthanolInput1,
    /// Ethanol duty (S300, percent) or ethanol content (K-Pro, percent).
    EthanolInput2,
    /// Ethanol content (S300, percent) or fuel temperature (K-Pro).
    EthanolInput3,
}

impl Channel {
    /// Every channel, in snapshot/storage order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Rpm,
        Channel::Speed,
        Channel::Gear,
        Channel::Voltage,
        Channel::Iat,
        Channel::Ect,
        Channel::Tps,
        Channel::Map,
        Channel::Inj,
        Channel::Ign,
        Channel::Lambda,
        Channel::KnockCount,
        Channel::CamAngleTarget,
        Channel::CamAngleActual,
        Channel::Analog0,
        Channel::Analog1,
        Channel::Analog2,
        Channel::Analog3,
        Channel::Analog4,
        Channel::Analog5,
        Channel::Analog6,
        Channel::Analog7,
        Channel::EthanolInput1,
        Channel::EthanolInput2,
        Channel::EthanolInput3,
    ];

    /// Slot index into the snapshot value array.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A decoded channel value.
///
/// Tagged union over the three numeric shapes the decoder produces. Columns
/// decide how to render a value, so the accessors are deliberately lossy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChannelValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl ChannelValue {
    pub fn as_u64(self) -> u64 {
        match self {
            ChannelValue::Unsigned(v) => v,
            ChannelValue::Signed(v) => v.max(0) as u64,
            ChannelValue::Float(v) => v as u64,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            ChannelValue::Unsigned(v) => v as i64,
            ChannelValue::Signed(v) => v,
            ChannelValue::Float(v) => v as i64,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            ChannelValue::Unsigned(v) => v as f64,
            ChannelValue::Signed(v) => v as f64,
            ChannelValue::Float(v) => v,
        }
    }
}

impl Default for ChannelValue {
    fn default() -> Self {
        ChannelValue::Unsigned(0)
    }
}

/// One channel overwrite produced by decoding a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelUpdate {
    pub channel: Channel,
    pub value: ChannelValue,
}

/// A raw bus frame: integer id plus up to 8 payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    pub id: u32,
    data: [u8; 8],
    len: u8,
}

impl RawFrame {
    /// Build a frame from a payload slice, truncating past 8 bytes.
    pub fn new(id: u32, payload: &[u8]) -> Self {
        let mut data = [0u8; 8];
        let len = payload.len().min(8);
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            data,
            len: len as u8,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}

/// A GPS position report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Wall-clock instant the fix was received.
    pub time: DateTime<Utc>,
}

/// Lap-timing state published to the snapshot as one atomic group.
///
/// `best_lap_ms` and `personal_best_ms` use 0 as the "unset" sentinel;
/// `personal_best_ms` is seeded from persisted records and survives across
/// sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LapSnapshot {
    /// Milliseconds since the session clock started.
    pub session_time_ms: u32,
    /// Completed-crossing counter, starting at 0.
    pub lap_index: u16,
    /// Session time at which the current lap started.
    pub lap_start_ms: u32,
    /// Fastest completed lap this session (0 = none yet).
    pub best_lap_ms: u32,
    /// Fastest lap ever recorded on this track (0 = none yet).
    pub personal_best_ms: u32,
    /// Duration of the most recently completed lap.
    pub previous_lap_ms: u32,
}

impl LapSnapshot {
    /// Elapsed time within the current lap.
    pub fn current_lap_ms(&self) -> u32 {
        self.session_time_ms.saturating_sub(self.lap_start_ms)
    }
}
