//! Event notification decoding
//!
//! The event interface hands over a buffer holding an event id and a data
//! word. Depending on the ACPI version the firmware concatenates them into
//! one of two layouts:
//!
//! ```text
//! 8 bytes:  [event_id:4][event_data:4]
//! 16 bytes: [event_id:4][reserved:4][event_data:4][reserved:4]
//! ```
//!
//! Some models notify without any event data when the Omen key is pressed;
//! that case decodes to a synthetic [`EventId::OmenKey`] notification.

use crate::error::DecodeError;
use crate::types::AcpiObject;

/// Known event identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EventId {
    Dock = 0x01,
    ParkHdd = 0x02,
    SmartAdapter = 0x03,
    BezelButton = 0x04,
    Wireless = 0x05,
    CpuBatteryThrottle = 0x06,
    LockSwitch = 0x07,
    LidSwitch = 0x08,
    ScreenRotation = 0x09,
    CoolsenseSystemMobile = 0x0A,
    CoolsenseSystemHot = 0x0B,
    ProximitySensor = 0x0C,
    BacklitKbBrightness = 0x0D,
    PeakshiftPeriod = 0x0F,
    BatteryChargePeriod = 0x10,
    OmenKey = 0x1D,
}

impl EventId {
    pub const ALL: [Self; 16] = [
        Self::Dock,
        Self::ParkHdd,
        Self::SmartAdapter,
        Self::BezelButton,
        Self::Wireless,
        Self::CpuBatteryThrottle,
        Self::LockSwitch,
        Self::LidSwitch,
        Self::ScreenRotation,
        Self::CoolsenseSystemMobile,
        Self::CoolsenseSystemHot,
        Self::ProximitySensor,
        Self::BacklitKbBrightness,
        Self::PeakshiftPeriod,
        Self::BatteryChargePeriod,
        Self::OmenKey,
    ];

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|id| *id as u32 == value)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dock => "DOCK",
            Self::ParkHdd => "PARK_HDD",
            Self::SmartAdapter => "SMART_ADAPTER",
            Self::BezelButton => "BEZEL_BUTTON",
            Self::Wireless => "WIRELESS",
            Self::CpuBatteryThrottle => "CPU_BATTERY_THROTTLE",
            Self::LockSwitch => "LOCK_SWITCH",
            Self::LidSwitch => "LID_SWITCH",
            Self::ScreenRotation => "SCREEN_ROTATION",
            Self::CoolsenseSystemMobile => "COOLSENSE_SYSTEM_MOBILE",
            Self::CoolsenseSystemHot => "COOLSENSE_SYSTEM_HOT",
            Self::ProximitySensor => "PROXIMITY_SENSOR",
            Self::BacklitKbBrightness => "BACKLIT_KB_BRIGHTNESS",
            Self::PeakshiftPeriod => "PEAKSHIFT_PERIOD",
            Self::BatteryChargePeriod => "BATTERY_CHARGE_PERIOD",
            Self::OmenKey => "OMEN_KEY",
        }
    }
}

/// Decoded notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub event_id: u32,
    pub event_data: u32,
}

impl Notification {
    pub fn new(event_id: u32, event_data: u32) -> Self {
        Self {
            event_id,
            event_data,
        }
    }

    /// Known identifier, if any
    pub fn id(&self) -> Option<EventId> {
        EventId::from_u32(self.event_id)
    }
}

fn word(bytes: &[u8], index: usize) -> Result<u32, DecodeError> {
    let start = index * 4;
    bytes
        .get(start..start + 4)
        .and_then(|w| w.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(DecodeError::TooShort {
            expected: start + 4,
            got: bytes.len(),
        })
}

/// Decode an event buffer of 8 or 16 bytes
pub fn parse_event_buffer(bytes: &[u8]) -> Result<Notification, DecodeError> {
    match bytes.len() {
        8 => Ok(Notification::new(word(bytes, 0)?, word(bytes, 1)?)),
        16 => Ok(Notification::new(word(bytes, 0)?, word(bytes, 2)?)),
        len => Err(DecodeError::NotificationLength(len)),
    }
}

/// Decode event data as fetched from the event interface.
///
/// A missing payload is the "woken without event data" case.
pub fn parse_notification(payload: Option<&AcpiObject>) -> Result<Notification, DecodeError> {
    match payload {
        None => Ok(Notification::new(EventId::OmenKey as u32, 0)),
        Some(AcpiObject::Buffer(bytes)) => parse_event_buffer(bytes),
        Some(other) => Err(DecodeError::NotABuffer(other.type_name())),
    }
}
