//! Integration tests for radio setup, block changes and refresh.
//!
//! Every test runs a full `Platform` against `EmulatedFirmware` and checks
//! both the queries the firmware received and the state pushed into the
//! in-memory kill-switch core.

use std::sync::Arc;

use hpwmi_platform::radio::set_legacy_blocked;
use hpwmi_platform::{
    InputRecorder, Platform, PlatformError, RadioKind, RadioMode, SoftRfkill,
};
use hpwmi_transport::protocol::query;
use hpwmi_transport::{BiosCommand, EmulatedFirmware, EmulatedFirmwareConfig, EmulatedRadio};

fn setup(config: EmulatedFirmwareConfig) -> (Arc<EmulatedFirmware>, SoftRfkill, Platform) {
    let firmware = Arc::new(EmulatedFirmware::new(config));
    let rfkill = SoftRfkill::new();
    let platform = Platform::builder(firmware.clone())
        .rfkill(Arc::new(rfkill.clone()))
        .input(Arc::new(InputRecorder::new()))
        .setup()
        .unwrap();
    (firmware, rfkill, platform)
}

fn radio(radio_type: u8, rfkill_id: u8, power: u8) -> EmulatedRadio {
    EmulatedRadio {
        radio_type,
        bus_type: 0,
        vendor_id: 0x8086,
        product_id: 0x2723,
        rfkill_id,
        power,
    }
}

fn enumerated(radios: Vec<EmulatedRadio>) -> EmulatedFirmwareConfig {
    EmulatedFirmwareConfig {
        radios: Some(radios),
        ..Default::default()
    }
}

// ── Legacy bitmask ──

#[test]
fn legacy_block_wifi_writes_select_bit_only() {
    let firmware = EmulatedFirmware::new(EmulatedFirmwareConfig {
        wireless: Some(0x000),
        ..Default::default()
    });
    set_legacy_blocked(&firmware, RadioKind::Wifi, true).unwrap();

    let writes = firmware.queries_for(BiosCommand::Write, query::WIRELESS);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].input, 0x100u32.to_le_bytes().to_vec());
    assert_eq!(writes[0].method, 1);
}

#[test]
fn legacy_setup_registers_present_radios() {
    // wifi enabled, bluetooth soft-blocked, wwan absent
    let mask: u32 = 0x03 | 0xA00 | 0x8_0000;
    let (firmware, rfkill, platform) = setup(EmulatedFirmwareConfig {
        wireless: Some(mask),
        ..Default::default()
    });

    assert_eq!(platform.radio_mode(), Some(RadioMode::Legacy));
    let switches = rfkill.switches();
    assert_eq!(switches.len(), 2);
    assert_eq!(switches[0].name, "hp-wifi");
    assert!(!switches[0].soft_blocked && !switches[0].hard_blocked);
    assert_eq!(switches[1].name, "hp-bluetooth");
    assert!(switches[1].soft_blocked);
    assert!(!switches[1].hard_blocked);

    // the bitmask is written back unchanged before registration
    let writes = firmware.queries_for(BiosCommand::Write, query::WIRELESS);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].input, mask.to_le_bytes().to_vec());
}

#[test]
fn legacy_block_then_refresh() {
    let (firmware, rfkill, platform) = setup(EmulatedFirmwareConfig {
        wireless: Some(0x01 | 0xA00),
        ..Default::default()
    });

    platform.set_radio_blocked(0, true).unwrap();
    assert_eq!(firmware.state().wireless, Some(0x801));
    let wifi = rfkill.get("hp-wifi").unwrap();
    assert!(wifi.soft_blocked);
    assert!(!wifi.hard_blocked);

    platform.set_radio_blocked(0, false).unwrap();
    assert_eq!(firmware.state().wireless, Some(0xA01));
    assert!(!rfkill.get("hp-wifi").unwrap().soft_blocked);
}

#[test]
fn legacy_hardware_switch_shows_after_refresh() {
    let (firmware, rfkill, platform) = setup(EmulatedFirmwareConfig {
        wireless: Some(0x01 | 0xA00),
        ..Default::default()
    });
    firmware.update(|state| state.wireless = Some(0x01 | 0x200));

    assert!(platform.refresh_radios().unwrap().is_empty());
    assert!(rfkill.get("hp-wifi").unwrap().hard_blocked);
}

// ── Enumerated list ──

#[test]
fn enumerated_setup_skips_placeholders_and_unknown_types() {
    let placeholder = EmulatedRadio {
        vendor_id: 0,
        ..radio(1, 0x11, 0x0F)
    };
    let (_firmware, rfkill, platform) = setup(enumerated(vec![
        radio(0, 0x10, 0x0F),
        placeholder,
        radio(9, 0x12, 0x0F),
        radio(1, 0x13, 0x02),
    ]));

    assert_eq!(platform.radio_mode(), Some(RadioMode::Enumerated));
    let radios = platform.radios();
    assert_eq!(radios.len(), 2);
    assert_eq!(radios[0].name, "hp-wifi");
    assert_eq!(radios[0].firmware_id, Some(0x10));
    assert_eq!(radios[0].position, Some(0));
    assert_eq!(radios[1].name, "hp-bluetooth");
    assert_eq!(radios[1].firmware_id, Some(0x13));
    assert_eq!(radios[1].position, Some(3));

    let bt = rfkill.get("hp-bluetooth").unwrap();
    assert!(!bt.soft_blocked);
    assert!(bt.hard_blocked);
}

#[test]
fn enumerated_block_addresses_firmware_id() {
    let (firmware, rfkill, platform) =
        setup(enumerated(vec![radio(0, 0x10, 0x0F), radio(1, 0x13, 0x0F)]));
    firmware.clear_queries();

    platform.set_radio_blocked(1, true).unwrap();

    let writes = firmware.queries_for(BiosCommand::Write, query::WIRELESS2);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].input, vec![0x01, 0x00, 0x13, 0x00]);
    assert_eq!(writes[0].method, 1);

    let radios = firmware.state().radios.unwrap();
    assert_eq!(radios[1].power, 0x0D);
    assert_eq!(radios[0].power, 0x0F);
    assert!(rfkill.get("hp-bluetooth").unwrap().soft_blocked);
    assert!(!rfkill.get("hp-wifi").unwrap().soft_blocked);
}

#[test]
fn block_unknown_index() {
    let (_firmware, _rfkill, platform) = setup(enumerated(vec![radio(0, 0x10, 0x0F)]));
    assert_eq!(
        platform.set_radio_blocked(5, true).unwrap_err(),
        PlatformError::UnknownRadio(5)
    );
}

#[test]
fn stale_device_is_skipped_while_others_update() {
    let (firmware, rfkill, platform) =
        setup(enumerated(vec![radio(0, 0x10, 0x0F), radio(1, 0x11, 0x0F)]));

    firmware.update(|state| {
        let radios = state.radios.as_mut().unwrap();
        radios[0].rfkill_id = 0x20;
        radios[0].power = 0x00;
        radios[1].power = 0x00;
    });

    assert_eq!(platform.refresh_radios().unwrap(), vec![0]);

    let wifi = rfkill.get("hp-wifi").unwrap();
    assert!(!wifi.soft_blocked && !wifi.hard_blocked);
    let bt = rfkill.get("hp-bluetooth").unwrap();
    assert!(bt.soft_blocked && bt.hard_blocked);
}

#[test]
fn device_gone_from_list_is_stale() {
    let (firmware, _rfkill, platform) =
        setup(enumerated(vec![radio(0, 0x10, 0x0F), radio(1, 0x11, 0x0F)]));
    firmware.update(|state| state.radios.as_mut().unwrap().truncate(1));

    assert_eq!(platform.refresh_radios().unwrap(), vec![1]);
}

#[test]
fn excess_device_count_falls_back_to_bitmask() {
    let (_firmware, rfkill, platform) = setup(EmulatedFirmwareConfig {
        radios: Some(vec![radio(0, 0x10, 0x0F)]),
        radio_count: Some(8),
        wireless: Some(0x01 | 0xA00),
        ..Default::default()
    });

    assert_eq!(platform.radio_mode(), Some(RadioMode::Legacy));
    assert_eq!(rfkill.switches().len(), 1);
}

#[test]
fn empty_enumerated_list_falls_back_to_bitmask() {
    let (_firmware, rfkill, platform) = setup(EmulatedFirmwareConfig {
        radios: Some(vec![]),
        wireless: Some(0x01 | 0xA00),
        ..Default::default()
    });

    assert_eq!(platform.radio_mode(), Some(RadioMode::Legacy));
    assert_eq!(platform.radios().len(), 1);
    assert!(!rfkill.get("hp-wifi").unwrap().soft_blocked);
}

#[test]
fn placeholder_only_list_falls_back_to_bitmask() {
    let placeholder = EmulatedRadio {
        vendor_id: 0,
        ..radio(0, 0x10, 0x0F)
    };
    let (_firmware, rfkill, platform) = setup(EmulatedFirmwareConfig {
        radios: Some(vec![placeholder, radio(9, 0x11, 0x0F)]),
        wireless: Some(0x02 | 0xA00_00),
        ..Default::default()
    });

    assert_eq!(platform.radio_mode(), Some(RadioMode::Legacy));
    assert_eq!(rfkill.switches().len(), 1);
    assert_eq!(rfkill.switches()[0].name, "hp-bluetooth");
}

#[test]
fn enumerated_list_preferred_over_bitmask() {
    let (firmware, _rfkill, platform) = setup(EmulatedFirmwareConfig {
        radios: Some(vec![radio(2, 0x30, 0x0F)]),
        wireless: Some(0x07),
        ..Default::default()
    });

    assert_eq!(platform.radio_mode(), Some(RadioMode::Enumerated));
    assert_eq!(platform.radios()[0].kind, RadioKind::Wwan);
    assert!(firmware
        .queries_for(BiosCommand::Read, query::WIRELESS)
        .is_empty());
}

#[test]
fn no_radio_interface_is_not_fatal() {
    let (_firmware, rfkill, platform) = setup(EmulatedFirmwareConfig::default());

    assert_eq!(platform.radio_mode(), None);
    assert!(rfkill.switches().is_empty());
    assert!(matches!(
        platform.set_radio_blocked(0, true),
        Err(PlatformError::NotSupported(_))
    ));
    assert!(platform.refresh_radios().unwrap().is_empty());
}
