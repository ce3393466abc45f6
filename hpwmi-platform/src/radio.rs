//! Radio state models
//!
//! Firmware reports radio state in one of two ways:
//!
//! - Legacy: one 32-bit bitmask (query 0x05). Per radio kind `k` the byte at
//!   `k*8` carries presence (bit `k` of byte 0), software enable (0x200) and
//!   hardware enable (0x800).
//! - Enumerated: a list of up to seven device records (query 0x1B), each with
//!   its own firmware device id and power flags.
//!
//! The model is picked once at setup and stays fixed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use hpwmi_transport::protocol::query;
use hpwmi_transport::{
    power, BiosCommand, BiosQuery, DecodeError, Transport, Wireless2Device, Wireless2State,
    MAX_WIRELESS2_DEVICES,
};

use crate::error::PlatformError;
use crate::rfkill::{RfkillRegistrar, RfkillSwitch};

/// Radio kind; the discriminant is the bit index in the legacy bitmask and
/// the `radio_type` of enumerated records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RadioKind {
    Wifi = 0,
    Bluetooth = 1,
    Wwan = 2,
    Gps = 3,
}

impl RadioKind {
    /// Kinds the legacy bitmask can announce
    pub const LEGACY: [Self; 3] = [Self::Wifi, Self::Bluetooth, Self::Wwan];

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Wifi),
            1 => Some(Self::Bluetooth),
            2 => Some(Self::Wwan),
            3 => Some(Self::Gps),
            _ => None,
        }
    }

    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// Registration name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Wifi => "hp-wifi",
            Self::Bluetooth => "hp-bluetooth",
            Self::Wwan => "hp-wwan",
            Self::Gps => "hp-gps",
        }
    }
}

/// Block flags of one radio
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockState {
    pub soft: bool,
    pub hard: bool,
}

impl BlockState {
    pub fn new(soft: bool, hard: bool) -> Self {
        Self { soft, hard }
    }
}

// =============================================================================
// Legacy bitmask
// =============================================================================

/// Legacy wireless bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacySnapshot(pub u32);

impl LegacySnapshot {
    pub fn read<T: Transport + ?Sized>(transport: &T) -> Result<Self, PlatformError> {
        Ok(Self(transport.read_int(query::WIRELESS)?))
    }

    pub fn is_present(&self, kind: RadioKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    /// Software enable bit clear
    pub fn soft_blocked(&self, kind: RadioKind) -> bool {
        self.0 & (0x200 << (kind.index() * 8)) == 0
    }

    /// Hardware enable bit clear
    pub fn hard_blocked(&self, kind: RadioKind) -> bool {
        self.0 & (0x800 << (kind.index() * 8)) == 0
    }

    pub fn state(&self, kind: RadioKind) -> BlockState {
        BlockState::new(self.soft_blocked(kind), self.hard_blocked(kind))
    }
}

/// Write payload selecting `kind` and setting its software enable bit
pub fn legacy_block_payload(kind: RadioKind, blocked: bool) -> u32 {
    (1 << (kind.index() + 8)) | (u32::from(!blocked) << kind.index())
}

pub fn set_legacy_blocked<T: Transport + ?Sized>(
    transport: &T,
    kind: RadioKind,
    blocked: bool,
) -> Result<(), PlatformError> {
    transport.write_int(query::WIRELESS, legacy_block_payload(kind, blocked))?;
    Ok(())
}

// =============================================================================
// Enumerated list
// =============================================================================

pub fn is_soft_blocked(power_flags: u8) -> bool {
    power_flags & power::SOFT == 0
}

/// Hardware-blocked unless both the BIOS and hardware allow bits are set
pub fn is_hard_blocked(power_flags: u8) -> bool {
    let allowed = power::BIOS | power::HARD;
    power_flags & allowed != allowed
}

pub fn power_state(power_flags: u8) -> BlockState {
    BlockState::new(is_soft_blocked(power_flags), is_hard_blocked(power_flags))
}

/// Write payload addressing a device by firmware id
pub fn enumerated_block_payload(firmware_id: u8, blocked: bool) -> [u8; 4] {
    [0x01, 0x00, firmware_id, u8::from(!blocked)]
}

pub fn set_enumerated_blocked<T: Transport + ?Sized>(
    transport: &T,
    firmware_id: u8,
    blocked: bool,
) -> Result<(), PlatformError> {
    let payload = enumerated_block_payload(firmware_id, blocked);
    transport.perform_query(query::WIRELESS2, BiosCommand::Write, &payload, &mut [])?;
    Ok(())
}

/// Decoded enumerated radio list
#[derive(Debug, Clone)]
pub struct EnumeratedSnapshot {
    devices: Vec<Wireless2Device>,
}

impl EnumeratedSnapshot {
    /// Decode the 128-byte list; a count beyond capacity is an error
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let state = Wireless2State::parse(bytes)?;
        let count = usize::from(state.count);
        if count > MAX_WIRELESS2_DEVICES {
            return Err(DecodeError::TooManyDevices {
                count,
                max: MAX_WIRELESS2_DEVICES,
            });
        }
        Ok(Self {
            devices: state.device[..count].to_vec(),
        })
    }

    pub fn read<T: Transport + ?Sized>(transport: &T) -> Result<Self, PlatformError> {
        let mut buf = [0u8; Wireless2State::SIZE];
        transport.perform_query(
            query::WIRELESS2,
            BiosCommand::Read,
            &[0u8; Wireless2State::SIZE],
            &mut buf,
        )?;
        Self::decode(&buf)
            .inspect_err(|e| warn!("unable to parse 0x1b query output: {}", e))
            .map_err(PlatformError::from)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn device(&self, position: usize) -> Option<&Wireless2Device> {
        self.devices.get(position)
    }

    pub fn devices(&self) -> &[Wireless2Device] {
        &self.devices
    }
}

// =============================================================================
// Model
// =============================================================================

/// Radio registered from the legacy bitmask
pub struct LegacyRadio {
    pub kind: RadioKind,
    handle: Box<dyn RfkillSwitch>,
}

/// Radio registered from the enumerated list
pub struct TrackedDevice {
    pub firmware_id: u8,
    /// Position in the list at setup time
    pub position: usize,
    pub kind: RadioKind,
    handle: Box<dyn RfkillSwitch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioMode {
    Legacy,
    Enumerated,
}

/// Summary of one registered radio
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadioInfo {
    pub index: usize,
    pub name: &'static str,
    pub kind: RadioKind,
    pub firmware_id: Option<u8>,
    pub position: Option<usize>,
}

/// The radio state model chosen at setup
pub enum RadioStateModel {
    Legacy(Vec<LegacyRadio>),
    Enumerated(Vec<TrackedDevice>),
}

impl RadioStateModel {
    /// Try the enumerated list first and fall back to the legacy bitmask
    ///
    /// A list that yields no trackable device counts as unavailable.
    pub fn probe<T: Transport + ?Sized>(
        transport: &T,
        registrar: &dyn RfkillRegistrar,
    ) -> Result<Self, PlatformError> {
        match Self::setup_enumerated(transport, registrar) {
            Ok(model) if !model.is_empty() => Ok(model),
            Ok(_) => {
                debug!("enumerated radio list tracks no devices, trying bitmask");
                Self::setup_legacy(transport, registrar)
            }
            Err(e) => {
                debug!("enumerated radio list unavailable ({}), trying bitmask", e);
                Self::setup_legacy(transport, registrar)
            }
        }
    }

    pub fn setup_enumerated<T: Transport + ?Sized>(
        transport: &T,
        registrar: &dyn RfkillRegistrar,
    ) -> Result<Self, PlatformError> {
        let snapshot = EnumeratedSnapshot::read(transport)?;
        let mut devices = Vec::with_capacity(snapshot.len());

        for (position, device) in snapshot.devices().iter().enumerate() {
            let Some(kind) = RadioKind::from_u8(device.radio_type) else {
                warn!("unknown device type 0x{:x}", device.radio_type);
                continue;
            };
            if device.vendor_id.get() == 0 {
                warn!("zero device {} while {} reported", position, snapshot.len());
                continue;
            }
            if device.power & power::BIOS == 0 {
                info!("device {} blocked by BIOS", kind.name());
            }

            let handle = registrar.register(kind.name(), kind, power_state(device.power))?;
            devices.push(TrackedDevice {
                firmware_id: device.rfkill_id,
                position,
                kind,
                handle,
            });
        }

        Ok(Self::Enumerated(devices))
    }

    pub fn setup_legacy<T: Transport + ?Sized>(
        transport: &T,
        registrar: &dyn RfkillRegistrar,
    ) -> Result<Self, PlatformError> {
        let snapshot = LegacySnapshot::read(transport)?;
        transport.write_int(query::WIRELESS, snapshot.0)?;

        let mut radios = Vec::new();
        for kind in RadioKind::LEGACY {
            if !snapshot.is_present(kind) {
                continue;
            }
            let handle = registrar.register(kind.name(), kind, snapshot.state(kind))?;
            radios.push(LegacyRadio { kind, handle });
        }

        Ok(Self::Legacy(radios))
    }

    pub fn mode(&self) -> RadioMode {
        match self {
            Self::Legacy(_) => RadioMode::Legacy,
            Self::Enumerated(_) => RadioMode::Enumerated,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Legacy(radios) => radios.len(),
            Self::Enumerated(devices) => devices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn radios(&self) -> Vec<RadioInfo> {
        match self {
            Self::Legacy(radios) => radios
                .iter()
                .enumerate()
                .map(|(index, r)| RadioInfo {
                    index,
                    name: r.kind.name(),
                    kind: r.kind,
                    firmware_id: None,
                    position: None,
                })
                .collect(),
            Self::Enumerated(devices) => devices
                .iter()
                .enumerate()
                .map(|(index, d)| RadioInfo {
                    index,
                    name: d.kind.name(),
                    kind: d.kind,
                    firmware_id: Some(d.firmware_id),
                    position: Some(d.position),
                })
                .collect(),
        }
    }

    /// Change the software block of the radio registered at `index`
    pub fn set_blocked<T: Transport + ?Sized>(
        &self,
        transport: &T,
        index: usize,
        blocked: bool,
    ) -> Result<(), PlatformError> {
        match self {
            Self::Legacy(radios) => {
                let radio = radios.get(index).ok_or(PlatformError::UnknownRadio(index))?;
                set_legacy_blocked(transport, radio.kind, blocked)
            }
            Self::Enumerated(devices) => {
                let device = devices.get(index).ok_or(PlatformError::UnknownRadio(index))?;
                set_enumerated_blocked(transport, device.firmware_id, blocked)
            }
        }
    }

    /// Re-read firmware state and push it to every control handle
    ///
    /// Returns the indices of tracked devices skipped as stale.
    pub fn refresh<T: Transport + ?Sized>(&self, transport: &T) -> Result<Vec<usize>, PlatformError> {
        match self {
            Self::Legacy(radios) => {
                let snapshot = LegacySnapshot::read(transport)?;
                for radio in radios {
                    let state = snapshot.state(radio.kind);
                    radio.handle.set_states(state.soft, state.hard);
                }
                Ok(Vec::new())
            }
            Self::Enumerated(devices) => {
                let snapshot = EnumeratedSnapshot::read(transport)?;
                let mut stale = Vec::new();
                for (index, tracked) in devices.iter().enumerate() {
                    match snapshot.device(tracked.position) {
                        Some(device) if device.rfkill_id == tracked.firmware_id => {
                            let state = power_state(device.power);
                            tracked.handle.set_states(state.soft, state.hard);
                        }
                        _ => {
                            warn!(
                                "power configuration of the wireless devices unexpectedly changed ({} at position {})",
                                tracked.kind.name(),
                                tracked.position
                            );
                            stale.push(index);
                        }
                    }
                }
                Ok(stale)
            }
        }
    }
}
