//! Integration tests for the attribute surface and four-zone lighting.

use std::sync::Arc;

use hpwmi_platform::{Attribute, Platform, PlatformConfig, PlatformError, ZoneColor};
use hpwmi_transport::protocol::{fourzone, query};
use hpwmi_transport::{BiosCommand, EmulatedFirmware, EmulatedFirmwareConfig};

fn setup_with(
    firmware: EmulatedFirmwareConfig,
    config: PlatformConfig,
) -> (Arc<EmulatedFirmware>, Platform) {
    let firmware = Arc::new(EmulatedFirmware::new(firmware));
    let platform = Platform::builder(firmware.clone())
        .config(config)
        .setup()
        .unwrap();
    (firmware, platform)
}

fn setup(firmware: EmulatedFirmwareConfig) -> (Arc<EmulatedFirmware>, Platform) {
    setup_with(firmware, PlatformConfig::default())
}

// ── Lighting ──

#[test]
fn zone_store_patches_only_its_bytes() {
    let blob: Vec<u8> = (0..128u8).collect();
    let (firmware, platform) = setup(EmulatedFirmwareConfig {
        fourzone: Some(blob.clone()),
        ..Default::default()
    });

    platform.store(Attribute::Zone(1), "FF8000\n").unwrap();

    let written = firmware.state().fourzone.unwrap();
    assert_eq!(&written[28..31], &[0xFF, 0x80, 0x00]);
    assert_eq!(&written[..28], &blob[..28]);
    assert_eq!(&written[31..], &blob[31..]);

    let sets = firmware.queries_for(BiosCommand::FourZone, fourzone::COLOR_SET);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].input.len(), 128);

    assert_eq!(
        platform.show(Attribute::Zone(1)).unwrap(),
        "red: 255, green: 128, blue: 0\n"
    );
}

#[test]
fn zone_accepts_prefixed_hex() {
    let (_firmware, platform) = setup(EmulatedFirmwareConfig::default());
    platform.store(Attribute::Zone(3), "0x00ff7f").unwrap();
    assert_eq!(platform.zone(3).unwrap(), ZoneColor::new(0x00, 0xFF, 0x7F));
}

#[test]
fn over_range_colour_rejected_before_write() {
    let (firmware, platform) = setup(EmulatedFirmwareConfig::default());
    firmware.clear_queries();

    let result = platform.store(Attribute::Zone(0), "1000000");
    assert!(matches!(result, Err(PlatformError::InvalidParameter(_))));
    assert!(platform.store(Attribute::Zone(0), "green").is_err());
    assert!(firmware.queries().is_empty());
}

#[test]
fn zones_hidden_when_disabled() {
    let (_firmware, platform) = setup_with(
        EmulatedFirmwareConfig::default(),
        PlatformConfig {
            fourzone: false,
            ..Default::default()
        },
    );

    assert!(!platform.fourzone_enabled());
    assert_eq!(platform.attributes(), Attribute::BASE.to_vec());
    assert!(matches!(
        platform.set_zone(0, ZoneColor::new(1, 2, 3)),
        Err(PlatformError::NotSupported(_))
    ));
}

#[test]
fn zones_listed_when_enabled() {
    let (_firmware, platform) = setup(EmulatedFirmwareConfig::default());
    let names: Vec<String> = platform.attributes().iter().map(|a| a.to_string()).collect();
    assert_eq!(
        names,
        [
            "display", "hddtemp", "als", "dock", "tablet", "postcode", "zone00", "zone01",
            "zone02", "zone03"
        ]
    );
}

#[test]
fn firmware_without_lighting_reports_query_error() {
    let (_firmware, platform) = setup(EmulatedFirmwareConfig {
        fourzone: None,
        ..Default::default()
    });
    assert!(matches!(
        platform.show(Attribute::Zone(0)),
        Err(PlatformError::Query(_))
    ));
    assert!(matches!(
        platform.store(Attribute::Zone(0), "123456"),
        Err(PlatformError::Query(_))
    ));
}

// ── Attributes ──

#[test]
fn show_renders_firmware_values() {
    let (_firmware, platform) = setup(EmulatedFirmwareConfig {
        display: 1,
        hddtemp: 38,
        als: 3,
        hardware: 0x04,
        postcode: 0x2A,
        ..Default::default()
    });

    assert_eq!(platform.show(Attribute::Display).unwrap(), "1\n");
    assert_eq!(platform.show(Attribute::HddTemp).unwrap(), "38\n");
    assert_eq!(platform.show(Attribute::Als).unwrap(), "3\n");
    assert_eq!(platform.show(Attribute::Dock).unwrap(), "0\n");
    assert_eq!(platform.show(Attribute::Tablet).unwrap(), "1\n");
    assert_eq!(platform.show(Attribute::PostCode).unwrap(), "0x2a\n");
}

#[test]
fn als_store_writes_value() {
    let (firmware, platform) = setup(EmulatedFirmwareConfig::default());
    firmware.clear_queries();

    platform.store(Attribute::Als, "5\n").unwrap();

    let writes = firmware.queries_for(BiosCommand::Write, query::ALS);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].input, 5u32.to_le_bytes().to_vec());
    assert_eq!(writes[0].method, 2);
    assert_eq!(firmware.state().als, 5);
}

#[test]
fn postcode_only_accepts_clear() {
    let (firmware, platform) = setup(EmulatedFirmwareConfig {
        postcode: 0x2A,
        ..Default::default()
    });
    firmware.clear_queries();

    assert!(matches!(
        platform.store(Attribute::PostCode, "2"),
        Err(PlatformError::InvalidParameter(_))
    ));
    assert!(platform.store(Attribute::PostCode, "one").is_err());
    assert!(firmware.queries().is_empty());

    platform.store(Attribute::PostCode, "1\n").unwrap();
    assert_eq!(firmware.state().postcode, 0);
    assert_eq!(platform.show(Attribute::PostCode).unwrap(), "0x0\n");
}

#[test]
fn read_only_attributes_reject_store() {
    let (_firmware, platform) = setup(EmulatedFirmwareConfig::default());
    for attr in [Attribute::Display, Attribute::HddTemp, Attribute::Dock, Attribute::Tablet] {
        assert!(matches!(
            platform.store(attr, "1"),
            Err(PlatformError::NotSupported(_))
        ));
    }
}
