//! Integration tests decoding whole Honda frames through the protocol table

use otl_core::{Channel, ChannelValue, TelemetrySnapshot};
use otl_ecu::{decode_frame, EcuVariant, ProtocolTable, Vehicle};

fn value_of(updates: &[otl_core::ChannelUpdate], channel: Channel) -> ChannelValue {
    updates
        .iter()
        .find(|u| u.channel == channel)
        .unwrap_or_else(|| panic!("no update for {:?}", channel))
        .value
}

#[test]
fn test_kpro_dash_frame_decodes_rpm_speed_gear_voltage() {
    let table = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
    // rpm 3000, speed 50 km/h, gear 3, voltage byte 100 -> 10.0 V.
    let payload = [0x0B, 0xB8, 0x00, 0x32, 0x03, 0x64, 0x00, 0x00];

    let updates = decode_frame(&table, 1632, &payload);
    assert_eq!(updates.len(), 4);
    assert_eq!(value_of(&updates, Channel::Rpm), ChannelValue::Unsigned(3000));
    assert_eq!(value_of(&updates, Channel::Speed), ChannelValue::Unsigned(50));
    assert_eq!(value_of(&updates, Channel::Gear), ChannelValue::Unsigned(3));
    assert_eq!(value_of(&updates, Channel::Voltage), ChannelValue::Float(10.0));
}

#[test]
fn test_low_and_high_scheme_frames_decode_identically() {
    let table = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
    let payload = [0x0B, 0xB8, 0x00, 0x32, 0x03, 0x64, 0x00, 0x00];
    assert_eq!(
        decode_frame(&table, 660, &payload),
        decode_frame(&table, 1632, &payload)
    );
}

#[test]
fn test_unknown_frame_id_is_silently_ignored() {
    let table = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
    assert!(decode_frame(&table, 999, &[0xFF; 8]).is_empty());
}

#[test]
fn test_ethanol_frame_interpretation_follows_the_configured_variant() {
    // byte0 = 128 Hz, byte1 = 50, bytes 2..4 = 0x012C.
    let payload = [0x80, 0x32, 0x01, 0x2C, 0x00, 0x00, 0x00, 0x00];

    let s300 = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::S300);
    let updates = decode_frame(&s300, 669, &payload);
    assert_eq!(value_of(&updates, Channel::EthanolInput1), ChannelValue::Unsigned(128));
    assert_eq!(
        value_of(&updates, Channel::EthanolInput2),
        ChannelValue::Float(f64::from(0x32u8) * 2.56),
        "S300 byte 1 is a duty percentage"
    );
    assert_eq!(value_of(&updates, Channel::EthanolInput3), ChannelValue::Unsigned(1));

    let kpro = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
    let updates = decode_frame(&kpro, 669, &payload);
    assert_eq!(
        value_of(&updates, Channel::EthanolInput2),
        ChannelValue::Unsigned(50),
        "K-Pro byte 1 is the ethanol content"
    );
    assert_eq!(
        value_of(&updates, Channel::EthanolInput3),
        ChannelValue::Unsigned(300),
        "K-Pro bytes 2..4 are the fuel temperature"
    );
}

#[test]
fn test_kpro_only_frames_do_nothing_on_s300() {
    let table = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::S300);
    assert!(decode_frame(&table, 665, &[0x00, 0x05]).is_empty());
    assert!(decode_frame(&table, 1638, &[0x00, 0x10, 0x00, 0x08]).is_empty());
}

#[test]
fn test_decoded_frames_land_in_the_snapshot() {
    let table = ProtocolTable::for_vehicle(Vehicle::Honda, EcuVariant::KPro);
    let snapshot = TelemetrySnapshot::new();

    snapshot.apply_updates(&decode_frame(
        &table,
        1632,
        &[0x0B, 0xB8, 0x00, 0x32, 0x03, 0x64, 0x00, 0x00],
    ));
    snapshot.apply_updates(&decode_frame(
        &table,
        1636,
        &[0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
    ));

    let reading = snapshot.read_all();
    assert_eq!(reading.value(Channel::Rpm), ChannelValue::Unsigned(3000));
    assert_eq!(reading.value(Channel::Lambda), ChannelValue::Float(1.0));
    // Channels no frame has touched keep their startup value.
    assert_eq!(reading.value(Channel::KnockCount), ChannelValue::Unsigned(0));
}
