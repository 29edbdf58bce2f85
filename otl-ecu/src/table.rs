//! Protocol tables: (vehicle, ECU variant) → frame layout
//!
//! Each table keys a canonical frame id to the list of channels packed into
//! that frame. The Honda message family is numbered under two schemes, a
//! low-id scheme (660..=669) and a high-id scheme (1632..=1641) offset by
//! 972, that denote the same logical messages, so lookups normalize high
//! ids before indexing. Unknown ids resolve to an empty entry list and are
//! silently ignored by the decoder.

use std::collections::HashMap;

use otl_core::Channel;

use crate::variant::{EcuVariant, Vehicle};

/// Maximum CAN payload length; every entry must fit inside it.
pub const CAN_PAYLOAD_LEN: usize = 8;

/// Numbering-scheme offset between the Honda high-id and low-id families.
const HONDA_ID_SHIFT: u32 = 972;

/// How the raw bytes of an entry convert into a channel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeKind {
    /// Single byte, as-is.
    U8,
    /// Big-endian unsigned 16-bit, as-is.
    U16,
    /// Battery voltage: byte / 10.0 V.
    Voltage,
    /// Raw 16-bit throttle with the 0xFFFF disconnected sentinel clamped to 0.
    Throttle,
    /// Manifold pressure: raw16 / 10 kPa (integer division).
    ManifoldKpa,
    /// Injector pulse width: raw16 / 1000 ms (integer division).
    InjectorMs,
    /// Lambda ratio: round((32768 / raw16) * 100) / 100, raw16 = 0 faults.
    Lambda,
    /// Cam angle: raw16 widened to a float, degrees.
    CamAngle,
    /// Thermistor resistance code through the Steinhart–Hart model, °C.
    OilTempC,
    /// Pressure-sender resistance ratio remapped to kPa, converted to psi.
    OilPressurePsi,
    /// Ethanol duty: byte * 2.56 percent.
    EthanolDuty,
}

impl DecodeKind {
    /// Payload bytes the kind consumes.
    pub fn width(self) -> usize {
        match self {
            DecodeKind::U8 | DecodeKind::Voltage | DecodeKind::EthanolDuty => 1,
            _ => 2,
        }
    }
}

/// One channel's slot within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolEntry {
    pub channel: Channel,
    pub offset: usize,
    pub width: usize,
    pub kind: DecodeKind,
}

impl ProtocolEntry {
    fn new(channel: Channel, offset: usize, kind: DecodeKind) -> Self {
        let width = kind.width();
        debug_assert!(offset + width <= CAN_PAYLOAD_LEN);
        Self {
            channel,
            offset,
            width,
            kind,
        }
    }
}

/// Immutable frame-id → channel-layout mapping for one (vehicle, variant).
pub struct ProtocolTable {
    frames: HashMap<u32, Vec<ProtocolEntry>>,
    /// High-id numbering scheme normalized down by this shift, when present.
    alias: Option<(std::ops::RangeInclusive<u32>, u32)>,
}

impl ProtocolTable {
    /// Build the table for a configured vehicle and ECU variant.
    pub fn for_vehicle(vehicle: Vehicle, variant: EcuVariant) -> Self {
        match vehicle {
            Vehicle::Honda => honda_table(variant),
            Vehicle::Mazda => mazda_table(),
        }
    }

    fn empty() -> Self {
        Self {
            frames: HashMap::new(),
            alias: None,
        }
    }

    fn add(&mut self, frame_id: u32, entries: Vec<ProtocolEntry>) {
        self.frames.insert(frame_id, entries);
    }

    fn canonical_id(&self, frame_id: u32) -> u32 {
        match &self.alias {
            Some((range, shift)) if range.contains(&frame_id) => frame_id - shift,
            _ => frame_id,
        }
    }

    /// Channels packed into `frame_id`; empty for unknown ids.
    pub fn lookup(&self, frame_id: u32) -> &[ProtocolEntry] {
        self.frames
            .get(&self.canonical_id(frame_id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn honda_table(variant: EcuVariant) -> ProtocolTable {
    use Channel::*;
    use DecodeKind as K;

    let mut table = ProtocolTable::empty();
    table.alias = Some((1632..=1641, HONDA_ID_SHIFT));

    table.add(
        660,
        vec![
            ProtocolEntry::new(Rpm, 0, K::U16),
            ProtocolEntry::new(Speed, 2, K::U16),
            ProtocolEntry::new(Gear, 4, K::U8),
            ProtocolEntry::new(Voltage, 5, K::Voltage),
        ],
    );
    table.add(
        661,
        vec![
            ProtocolEntry::new(Iat, 0, K::U16),
            ProtocolEntry::new(Ect, 2, K::U16),
        ],
    );
    table.add(
        662,
        vec![
            ProtocolEntry::new(Tps, 0, K::Throttle),
            ProtocolEntry::new(Map, 2, K::ManifoldKpa),
        ],
    );
    table.add(
        663,
        vec![
            ProtocolEntry::new(Inj, 0, K::InjectorMs),
            ProtocolEntry::new(Ign, 2, K::U16),
        ],
    );
    table.add(664, vec![ProtocolEntry::new(Lambda, 0, K::Lambda)]);

    // Knock and cam telemetry exist on K-Pro firmware only.
    if variant == EcuVariant::KPro {
        table.add(665, vec![ProtocolEntry::new(KnockCount, 0, K::U16)]);
        table.add(
            666,
            vec![
                ProtocolEntry::new(CamAngleTarget, 0, K::CamAngle),
                ProtocolEntry::new(CamAngleActual, 2, K::CamAngle),
            ],
        );
    }

    table.add(
        667,
        vec![
            ProtocolEntry::new(Analog0, 0, K::OilTempC),
            ProtocolEntry::new(Analog1, 2, K::OilPressurePsi),
            ProtocolEntry::new(Analog2, 4, K::U16),
            ProtocolEntry::new(Analog3, 6, K::U16),
        ],
    );
    table.add(
        668,
        vec![
            ProtocolEntry::new(Analog4, 0, K::U16),
            ProtocolEntry::new(Analog5, 2, K::U16),
            ProtocolEntry::new(Analog6, 4, K::U16),
            ProtocolEntry::new(Analog7, 6, K::U16),
        ],
    );

    // The fuel-composition frame is laid out differently per variant; the
    // interpretation is fixed here, at table build time.
    let ethanol = match variant {
        EcuVariant::S300 => vec![
            ProtocolEntry::new(EthanolInput1, 0, K::U8),
            ProtocolEntry::new(EthanolInput2, 1, K::EthanolDuty),
            ProtocolEntry::new(EthanolInput3, 2, K::U8),
        ],
        EcuVariant::KPro => vec![
            ProtocolEntry::new(EthanolInput1, 0, K::U8),
            ProtocolEntry::new(EthanolInput2, 1, K::U8),
            ProtocolEntry::new(EthanolInput3, 2, K::U16),
        ],
    };
    table.add(669, ethanol);

    table
}

fn mazda_table() -> ProtocolTable {
    let mut table = ProtocolTable::empty();
    table.add(
        513,
        vec![ProtocolEntry::new(Channel::Tps, 6, DecodeKind::U8)],
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_fits_the_payload() {
        let tables = [
            ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::S300),
            ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro),
            ProtocolTable::for_vehicle(Vehicle::Mazda, EcuVariant::KPro),
        ];
        for table in &tables {
            for entries in table.frames.values() {
                for entry in entries {
                    assert!(
                        entry.offset + entry.width <= CAN_PAYLOAD_LEN,
                        "{:?} overruns the payload",
                        entry.channel
                    );
                }
            }
        }
    }

    #[test]
    fn test_unknown_id_resolves_to_empty() {
        let table = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
        assert!(table.lookup(999).is_empty());
        assert!(table.lookup(0).is_empty());
    }

    #[test]
    fn test_high_and_low_numbering_schemes_alias() {
        let table = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
        for (low, high) in (660..=669).zip(1632..=1641) {
            assert_eq!(
                table.lookup(low),
                table.lookup(high),
                "ids {low} and {high} must denote the same message"
            );
        }
        // The shift applies to the aliased family only.
        assert!(table.lookup(1631).is_empty());
        assert!(table.lookup(1642).is_empty());
    }

    #[test]
    fn test_kpro_only_frames_absent_from_s300() {
        let s300 = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::S300);
        assert!(s300.lookup(665).is_empty());
        assert!(s300.lookup(666).is_empty());

        let kpro = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
        assert_eq!(kpro.lookup(665).len(), 1);
        assert_eq!(kpro.lookup(666).len(), 2);
    }

    #[test]
    fn test_ethanol_layout_differs_per_variant() {
        let s300 = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::S300);
        let kpro = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
        assert_ne!(s300.lookup(669), kpro.lookup(669));
        assert_eq!(
            s300.lookup(669)[1].kind,
            DecodeKind::EthanolDuty,
            "S300 carries duty in byte 1"
        );
        assert_eq!(
            kpro.lookup(669)[2].kind,
            DecodeKind::U16,
            "K-Pro carries fuel temperature in bytes 2..4"
        );
    }

    #[test]
    fn test_mazda_table_is_sparse() {
        let table = ProtocolTable::for_vehicle(Vehicle::Mazda, EcuVariant::S300);
        assert_eq!(table.lookup(513).len(), 1);
        assert!(table.lookup(660).is_empty());
        assert!(table.lookup(1632).is_empty(), "no alias outside the Honda family");
    }
}
