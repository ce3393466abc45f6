//! In-memory emulation of the HP WMI firmware
//!
//! `EmulatedFirmware` speaks the same request/response envelope as the real
//! BIOS interface, keeps a small mutable firmware model, records every query
//! it receives and can inject event notifications. It backs the CLI when no
//! hardware is involved and the integration tests.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use zerocopy::byteorder::little_endian::U16;
use zerocopy::IntoBytes;

use crate::command::{
    encode_response, power, BiosArgs, Wireless2Device, Wireless2State, MAX_WIRELESS2_DEVICES,
};
use crate::error::TransportError;
use crate::protocol::{fourzone, query, BiosCommand, ReturnCode, SIGNATURE};
use crate::types::{AcpiObject, InterfaceId, RawNotification};
use crate::Transport;

/// Broadcast channel capacity for injected notifications
const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

/// One radio in the enumerated wireless list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatedRadio {
    /// 0 = wifi, 1 = bluetooth, 2 = wwan, 3 = gps
    pub radio_type: u8,
    #[serde(default)]
    pub bus_type: u8,
    pub vendor_id: u16,
    #[serde(default)]
    pub product_id: u16,
    /// Firmware device id used to address the radio
    pub rfkill_id: u8,
    /// State / soft / BIOS / hard bits
    #[serde(default = "default_power")]
    pub power: u8,
}

fn default_power() -> u8 {
    power::STATE | power::SOFT | power::BIOS | power::HARD
}

/// Query family forced to fail with a given return code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectedError {
    pub query: u32,
    pub code: u32,
}

/// Firmware model; doubles as the TOML description of an emulated machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatedFirmwareConfig {
    pub event_interface: bool,
    pub bios_interface: bool,
    /// Legacy wireless bitmask; `None` makes query 0x05 unsupported
    pub wireless: Option<u32>,
    /// Enumerated radio list; `None` makes query 0x1B unsupported
    pub radios: Option<Vec<EmulatedRadio>>,
    /// Reported device count, when it should disagree with `radios`
    pub radio_count: Option<u8>,
    pub hardware: u32,
    pub display: u32,
    pub hddtemp: u32,
    pub als: u32,
    pub postcode: u32,
    pub hotkey: u32,
    /// Feature marker query (0x0B) implemented
    pub feature: bool,
    /// Feature2 marker query (0x0D) implemented
    pub feature2: bool,
    /// Four-zone lighting blob; `None` makes the lighting family unsupported
    pub fourzone: Option<Vec<u8>>,
    pub errors: Vec<InjectedError>,
}

impl Default for EmulatedFirmwareConfig {
    fn default() -> Self {
        Self {
            event_interface: true,
            bios_interface: true,
            wireless: None,
            radios: None,
            radio_count: None,
            hardware: 0,
            display: 0,
            hddtemp: 0,
            als: 0,
            postcode: 0,
            hotkey: 0,
            feature: true,
            feature2: true,
            fourzone: Some(vec![0; fourzone::BLOB_SIZE]),
            errors: Vec::new(),
        }
    }
}

/// A query as received by the emulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedQuery {
    pub method: u32,
    pub command: u32,
    pub query: u32,
    pub input: Vec<u8>,
}

/// Emulated firmware transport
pub struct EmulatedFirmware {
    state: Mutex<EmulatedFirmwareConfig>,
    log: Mutex<Vec<RecordedQuery>>,
    hotkeys_enabled: Mutex<Option<u32>>,
    /// Set by the first wireless bitmask write
    wireless_acknowledged: Mutex<bool>,
    notify_tx: broadcast::Sender<RawNotification>,
}

impl EmulatedFirmware {
    pub fn new(config: EmulatedFirmwareConfig) -> Self {
        let (notify_tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(config),
            log: Mutex::new(Vec::new()),
            hotkeys_enabled: Mutex::new(None),
            wireless_acknowledged: Mutex::new(false),
            notify_tx,
        }
    }

    /// Snapshot of the firmware model
    pub fn state(&self) -> EmulatedFirmwareConfig {
        self.state.lock().clone()
    }

    /// Mutate the firmware model (simulating hardware-side changes)
    pub fn update<F: FnOnce(&mut EmulatedFirmwareConfig)>(&self, f: F) {
        f(&mut self.state.lock());
    }

    /// All queries received so far
    pub fn queries(&self) -> Vec<RecordedQuery> {
        self.log.lock().clone()
    }

    /// Queries of one family and command
    pub fn queries_for(&self, command: BiosCommand, query: u32) -> Vec<RecordedQuery> {
        self.log
            .lock()
            .iter()
            .filter(|q| q.command == command as u32 && q.query == query)
            .cloned()
            .collect()
    }

    pub fn clear_queries(&self) {
        self.log.lock().clear();
    }

    /// Value written to the BIOS query, if hotkeys were switched on
    pub fn hotkeys_enabled(&self) -> Option<u32> {
        *self.hotkeys_enabled.lock()
    }

    /// Deliver a notification to subscribers; returns how many received it
    pub fn notify(&self, notification: RawNotification) -> usize {
        self.notify_tx.send(notification).unwrap_or(0)
    }

    fn handle(&self, method: u32, input: &[u8]) -> Result<Vec<u8>, TransportError> {
        let args = BiosArgs::parse(input).map_err(|e| TransportError::Internal(e.to_string()))?;
        self.log.lock().push(RecordedQuery {
            method,
            command: args.command(),
            query: args.commandtype(),
            input: args.input().to_vec(),
        });

        if args.signature() != SIGNATURE {
            return Ok(failure(ReturnCode::WrongSignature));
        }

        let mut state = self.state.lock();
        if let Some(err) = state.errors.iter().find(|e| e.query == args.commandtype()) {
            return Ok(encode_response(err.code, &[]));
        }

        let response = match BiosCommand::from_u32(args.command()) {
            Some(BiosCommand::Read) => read(&state, args.commandtype()),
            Some(BiosCommand::Write) => {
                let result = write(
                    &mut state,
                    &args,
                    &mut self.wireless_acknowledged.lock(),
                );
                if result.is_ok() && args.commandtype() == query::BIOS {
                    *self.hotkeys_enabled.lock() = Some(args.input_u32());
                }
                result
            }
            Some(BiosCommand::FourZone) => lighting(&mut state, &args),
            Some(BiosCommand::Odm) => Err(ReturnCode::UnknownCommandType),
            None => Err(ReturnCode::UnknownCommand),
        };

        Ok(match response {
            Ok(output) => encode_response(0, &output),
            Err(code) => {
                debug!(
                    "emulated firmware rejects query 0x{:x}: {}",
                    args.commandtype(),
                    code
                );
                failure(code)
            }
        })
    }
}

fn failure(code: ReturnCode) -> Vec<u8> {
    encode_response(code.raw(), &[])
}

fn int(value: u32) -> Result<Vec<u8>, ReturnCode> {
    Ok(value.to_le_bytes().to_vec())
}

fn wireless2_state(state: &EmulatedFirmwareConfig, radios: &[EmulatedRadio]) -> Wireless2State {
    let mut out = Wireless2State {
        count: state.radio_count.unwrap_or(radios.len() as u8),
        ..Default::default()
    };
    for (slot, radio) in out.device.iter_mut().zip(radios.iter().take(MAX_WIRELESS2_DEVICES)) {
        *slot = Wireless2Device {
            radio_type: radio.radio_type,
            bus_type: radio.bus_type,
            vendor_id: U16::new(radio.vendor_id),
            product_id: U16::new(radio.product_id),
            rfkill_id: radio.rfkill_id,
            power: radio.power,
            ..Default::default()
        };
    }
    out
}

fn read(state: &EmulatedFirmwareConfig, query: u32) -> Result<Vec<u8>, ReturnCode> {
    match query {
        query::DISPLAY => int(state.display),
        query::HDDTEMP => int(state.hddtemp),
        query::ALS => int(state.als),
        query::HARDWARE => int(state.hardware),
        query::HOTKEY => int(state.hotkey),
        query::POSTCODEERROR => int(state.postcode),
        query::WIRELESS => state.wireless.map_or(Err(ReturnCode::UnknownCommandType), int),
        query::WIRELESS2 => match &state.radios {
            Some(radios) => Ok(wireless2_state(state, radios).as_bytes().to_vec()),
            None => Err(ReturnCode::UnknownCommandType),
        },
        query::FEATURE if state.feature => int(0),
        query::FEATURE2 if state.feature2 => Ok(vec![0; 128]),
        _ => Err(ReturnCode::UnknownCommandType),
    }
}

fn write(
    state: &mut EmulatedFirmwareConfig,
    args: &BiosArgs,
    wireless_acknowledged: &mut bool,
) -> Result<Vec<u8>, ReturnCode> {
    let value = args.input_u32();
    match args.commandtype() {
        query::ALS => {
            state.als = value;
            int(value)
        }
        query::POSTCODEERROR if value == 1 => {
            state.postcode = 0;
            int(0)
        }
        query::POSTCODEERROR => Err(ReturnCode::InputDataInvalid),
        query::BIOS => Ok(Vec::new()),
        query::WIRELESS => {
            let wireless = state.wireless.as_mut().ok_or(ReturnCode::UnknownCommandType)?;
            // The first write echoing the current mask acknowledges it
            let first = !std::mem::replace(wireless_acknowledged, true);
            if first && value == *wireless {
                return Ok(Vec::new());
            }
            for kind in 0..4 {
                if value & (1 << (kind + 8)) == 0 {
                    continue;
                }
                let soft = 0x200 << (kind * 8);
                if value & (1 << kind) != 0 {
                    *wireless |= soft;
                } else {
                    *wireless &= !soft;
                }
            }
            Ok(Vec::new())
        }
        query::WIRELESS2 => {
            let radios = state.radios.as_mut().ok_or(ReturnCode::UnknownCommandType)?;
            let data = args.input();
            if data.len() < 4 || data[0] != 0x01 {
                return Err(ReturnCode::InputDataInvalid);
            }
            let radio = radios
                .iter_mut()
                .find(|r| r.rfkill_id == data[2])
                .ok_or(ReturnCode::InputDataInvalid)?;
            if data[3] != 0 {
                radio.power |= power::SOFT;
            } else {
                radio.power &= !power::SOFT;
            }
            Ok(Vec::new())
        }
        _ => Err(ReturnCode::UnknownCommandType),
    }
}

fn lighting(state: &mut EmulatedFirmwareConfig, args: &BiosArgs) -> Result<Vec<u8>, ReturnCode> {
    let blob = state.fourzone.as_mut().ok_or(ReturnCode::UnknownCommandType)?;
    blob.resize(fourzone::BLOB_SIZE, 0);
    match args.commandtype() {
        fourzone::COLOR_GET => Ok(blob.clone()),
        fourzone::COLOR_SET => {
            blob.copy_from_slice(args.data());
            Ok(blob.clone())
        }
        _ => Err(ReturnCode::UnknownCommandType),
    }
}

impl Transport for EmulatedFirmware {
    fn evaluate_method(
        &self,
        interface: InterfaceId,
        _instance: u8,
        method_id: u32,
        input: &[u8],
    ) -> Result<Option<AcpiObject>, TransportError> {
        if !self.has_interface(interface) || interface != InterfaceId::Bios {
            return Err(TransportError::InterfaceMissing(interface));
        }
        self.handle(method_id, input).map(|buf| Some(AcpiObject::Buffer(buf)))
    }

    fn has_interface(&self, interface: InterfaceId) -> bool {
        let state = self.state.lock();
        match interface {
            InterfaceId::Event => state.event_interface,
            InterfaceId::Bios => state.bios_interface,
        }
    }

    fn subscribe_notifications(&self) -> Option<broadcast::Receiver<RawNotification>> {
        self.has_interface(InterfaceId::Event)
            .then(|| self.notify_tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::BiosQuery;
    use crate::error::QueryError;

    fn wifi_radio(id: u8) -> EmulatedRadio {
        EmulatedRadio {
            radio_type: 0,
            bus_type: 0,
            vendor_id: 0x8086,
            product_id: 0x2723,
            rfkill_id: id,
            power: default_power(),
        }
    }

    #[test]
    fn test_integer_reads() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig {
            display: 1,
            hddtemp: 42,
            ..Default::default()
        });
        assert_eq!(fw.read_int(query::DISPLAY).unwrap(), 1);
        assert_eq!(fw.read_int(query::HDDTEMP).unwrap(), 42);
        assert_eq!(fw.queries().len(), 2);
        assert_eq!(fw.queries()[0].method, 2);
    }

    #[test]
    fn test_missing_families_are_unsupported() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig::default());
        assert!(fw.read_int(query::WIRELESS).unwrap_err().is_unsupported());
        assert!(fw.read_int(query::BATTERY).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_injected_error() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig {
            errors: vec![InjectedError {
                query: query::DISPLAY,
                code: 0x07,
            }],
            ..Default::default()
        });
        assert_eq!(
            fw.read_int(query::DISPLAY),
            Err(QueryError::Firmware(ReturnCode::InputDataInvalid))
        );
    }

    #[test]
    fn test_legacy_wireless_write() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig {
            wireless: Some(0x0A03),
            ..Default::default()
        });
        // Select wifi, enable bit clear: soft-disable
        fw.write_int(query::WIRELESS, 0x100).unwrap();
        assert_eq!(fw.state().wireless, Some(0x0803));
        fw.write_int(query::WIRELESS, 0x101).unwrap();
        assert_eq!(fw.state().wireless, Some(0x0A03));
    }

    #[test]
    fn test_legacy_echo_only_acknowledged_once() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig {
            wireless: Some(0x2_0301),
            ..Default::default()
        });
        fw.write_int(query::WIRELESS, 0x2_0301).unwrap();
        assert_eq!(fw.state().wireless, Some(0x2_0301));

        // Same payload again is a select write: bit 9 selects bluetooth, bit 1 clear
        fw.write_int(query::WIRELESS, 0x2_0301).unwrap();
        assert_eq!(fw.state().wireless, Some(0x0_0301));
    }

    #[test]
    fn test_wireless2_write_toggles_soft_bit() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig {
            radios: Some(vec![wifi_radio(3)]),
            ..Default::default()
        });
        fw.perform_query(query::WIRELESS2, BiosCommand::Write, &[1, 0, 3, 0], &mut [])
            .unwrap();
        assert_eq!(fw.state().radios.unwrap()[0].power & power::SOFT, 0);

        let err = fw
            .perform_query(query::WIRELESS2, BiosCommand::Write, &[1, 0, 9, 1], &mut [])
            .unwrap_err();
        assert_eq!(err.return_code(), Some(ReturnCode::InputDataInvalid));
    }

    #[test]
    fn test_wireless2_read_layout() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig {
            radios: Some(vec![wifi_radio(3), wifi_radio(4)]),
            ..Default::default()
        });
        let mut buf = [0u8; 128];
        fw.perform_query(query::WIRELESS2, BiosCommand::Read, &[], &mut buf)
            .unwrap();
        let state = Wireless2State::parse(&buf).unwrap();
        assert_eq!(state.count, 2);
        assert_eq!(state.device[1].rfkill_id, 4);
        assert_eq!(state.device[1].vendor_id.get(), 0x8086);
    }

    #[test]
    fn test_fourzone_round_trip() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig::default());
        let mut blob = [0u8; 128];
        blob[25] = 0xFF;
        fw.perform_query(
            fourzone::COLOR_SET,
            BiosCommand::FourZone,
            &blob,
            &mut [0u8; 128],
        )
        .unwrap();
        let mut out = [0u8; 128];
        fw.perform_query(fourzone::COLOR_GET, BiosCommand::FourZone, &[], &mut out)
            .unwrap();
        assert_eq!(out[25], 0xFF);
    }

    #[test]
    fn test_bad_signature_and_unknown_command() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig::default());
        let mut args = BiosArgs::new(BiosCommand::Read, query::DISPLAY, &[])
            .unwrap()
            .as_bytes()
            .to_vec();
        args[0] = 0;
        let reply = fw.evaluate_method(InterfaceId::Bios, 0, 2, &args).unwrap();
        let Some(AcpiObject::Buffer(bytes)) = reply else {
            panic!("expected buffer");
        };
        let (envelope, _) = crate::command::decode_response(&bytes).unwrap();
        assert_eq!(envelope.return_code(), 2);

        let mut args = BiosArgs::new(BiosCommand::Read, query::DISPLAY, &[])
            .unwrap()
            .as_bytes()
            .to_vec();
        args[4] = 0x55;
        let reply = fw.evaluate_method(InterfaceId::Bios, 0, 2, &args).unwrap();
        let Some(AcpiObject::Buffer(bytes)) = reply else {
            panic!("expected buffer");
        };
        let (envelope, _) = crate::command::decode_response(&bytes).unwrap();
        assert_eq!(envelope.return_code(), 3);
    }

    #[test]
    fn test_notifications_reach_subscribers() {
        let fw = EmulatedFirmware::new(EmulatedFirmwareConfig::default());
        let mut rx = fw.subscribe_notifications().unwrap();
        assert_eq!(fw.notify(RawNotification::new(0x80, None)), 1);
        assert_eq!(rx.try_recv().unwrap(), RawNotification::new(0x80, None));
    }

    #[test]
    fn test_config_from_toml_shape() {
        let fw = EmulatedFirmwareConfig::default();
        assert!(fw.event_interface && fw.bios_interface);
        assert_eq!(fw.fourzone.as_ref().map(Vec::len), Some(128));
    }
}
