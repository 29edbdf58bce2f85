//! Frame decoding and unit conversion
//!
//! Pure functions from raw frame bytes to channel values. A decode fault
//! (short payload, undefined lambda) skips that channel only; the previous
//! value stays in the snapshot and ingestion continues.

use otl_core::{Channel, ChannelUpdate, ChannelValue};
use thiserror::Error;

use crate::table::{DecodeKind, ProtocolEntry, ProtocolTable};

// Steinhart–Hart coefficients for the oil-temperature thermistor.
const OIL_TEMP_A: f64 = 0.001_422_209_5;
const OIL_TEMP_B: f64 = 0.000_237_290_17;
const OIL_TEMP_C: f64 = 9.327_399_8e-8;

// Oil-pressure sender: ADC counts per unit of resistance ratio, the ratio
// domain, and the remapped kPa range.
const OIL_PRESSURE_COUNTS_PER_RATIO: f64 = 819.2;
const OIL_PRESSURE_RATIO_LOW: f64 = 0.0;
const OIL_PRESSURE_RATIO_HIGH: f64 = 5.0;
const OIL_PRESSURE_KPA_LOW: f64 = -100.0;
const OIL_PRESSURE_KPA_HIGH: f64 = 1100.0;
const KPA_TO_PSI: f64 = 0.145_038;

/// Throttle sensor-disconnected sentinel.
const TPS_DISCONNECTED: u16 = 0xFFFF;

/// A single-channel decode fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload too short for {channel:?}: need {need} bytes, frame has {have}")]
    ShortPayload {
        channel: Channel,
        need: usize,
        have: usize,
    },
    #[error("lambda raw value 0 is undefined")]
    ZeroLambda,
}

/// Decode one frame into its channel updates.
///
/// Unknown ids produce no updates; faulted channels are skipped. Total over
/// any payload.
pub fn decode_frame(table: &ProtocolTable, frame_id: u32, payload: &[u8]) -> Vec<ChannelUpdate> {
    let entries = table.lookup(frame_id);
    let mut updates = Vec::with_capacity(entries.len());
    for entry in entries {
        match decode_entry(entry, payload) {
            Ok(value) => updates.push(ChannelUpdate {
                channel: entry.channel,
                value,
            }),
            Err(err) => {
                tracing::debug!(frame_id, channel = ?entry.channel, %err, "channel update skipped");
            }
        }
    }
    updates
}

/// Decode one table entry out of a frame payload.
pub fn decode_entry(entry: &ProtocolEntry, payload: &[u8]) -> Result<ChannelValue, DecodeError> {
    if payload.len() < entry.offset + entry.width {
        return Err(DecodeError::ShortPayload {
            channel: entry.channel,
            need: entry.offset + entry.width,
            have: payload.len(),
        });
    }

    let value = match entry.kind {
        DecodeKind::U8 => ChannelValue::Unsigned(u64::from(payload[entry.offset])),
        DecodeKind::U16 => ChannelValue::Unsigned(u64::from(be16(payload, entry.offset))),
        DecodeKind::Voltage => ChannelValue::Float(f64::from(payload[entry.offset]) / 10.0),
        DecodeKind::Throttle => {
            let raw = be16(payload, entry.offset);
            ChannelValue::Unsigned(if raw == TPS_DISCONNECTED { 0 } else { u64::from(raw) })
        }
        DecodeKind::ManifoldKpa => {
            ChannelValue::Unsigned(u64::from(be16(payload, entry.offset) / 10))
        }
        DecodeKind::InjectorMs => {
            ChannelValue::Unsigned(u64::from(be16(payload, entry.offset) / 1000))
        }
        DecodeKind::Lambda => {
            let raw = be16(payload, entry.offset);
            if raw == 0 {
                return Err(DecodeError::ZeroLambda);
            }
            ChannelValue::Float((32_768.0 / f64::from(raw) * 100.0).round() / 100.0)
        }
        DecodeKind::CamAngle => ChannelValue::Float(f64::from(be16(payload, entry.offset))),
        DecodeKind::OilTempC => {
            let ln_r = f64::from(be16(payload, entry.offset)).ln();
            let kelvin = 1.0 / (OIL_TEMP_A + OIL_TEMP_B * ln_r + OIL_TEMP_C * ln_r.powi(3));
            ChannelValue::Signed((kelvin - 273.15).round() as i64)
        }
        DecodeKind::OilPressurePsi => {
            let ratio = f64::from(be16(payload, entry.offset)) / OIL_PRESSURE_COUNTS_PER_RATIO;
            let kpa = (ratio - OIL_PRESSURE_RATIO_LOW)
                / (OIL_PRESSURE_RATIO_HIGH - OIL_PRESSURE_RATIO_LOW)
                * (OIL_PRESSURE_KPA_HIGH - OIL_PRESSURE_KPA_LOW)
                + OIL_PRESSURE_KPA_LOW;
            ChannelValue::Signed((kpa * KPA_TO_PSI).round() as i64)
        }
        DecodeKind::EthanolDuty => {
            ChannelValue::Float(f64::from(payload[entry.offset]) * 2.56)
        }
    };
    Ok(value)
}

fn be16(payload: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([payload[offset], payload[offset + 1]])
}
