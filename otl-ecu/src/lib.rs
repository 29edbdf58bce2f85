//! OpenTrackLog ECU Protocol Library
//!
//! Maps CAN frame ids to physical channels per (vehicle, ECU variant) and
//! decodes raw frame payloads into channel values, applying the per-channel
//! unit-conversion formulas. Adding a vehicle or ECU variant means adding
//! table entries, not decode code paths.

pub mod decode;
pub mod table;
pub mod variant;

pub use decode::{decode_entry, decode_frame, DecodeError};
pub use table::{DecodeKind, ProtocolEntry, ProtocolTable};
pub use variant::{EcuVariant, Vehicle};
