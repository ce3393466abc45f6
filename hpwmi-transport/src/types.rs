//! Common types for the transport layer

use std::fmt;

use serde::{Deserialize, Serialize};

/// WMI interface identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceId {
    /// Asynchronous event notifications (hotkeys, docking, radios)
    Event,
    /// BIOS query methods
    Bios,
}

impl InterfaceId {
    pub const EVENT_GUID: &'static str = "95F24279-4D7B-4334-9387-ACCDC67EF61C";
    pub const BIOS_GUID: &'static str = "5FB7F034-2C63-45e9-BE91-3D44E2C707E4";

    /// GUID the platform firmware publishes for this interface
    pub fn guid(&self) -> &'static str {
        match self {
            Self::Event => Self::EVENT_GUID,
            Self::Bios => Self::BIOS_GUID,
        }
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event => write!(f, "event ({})", self.guid()),
            Self::Bios => write!(f, "bios ({})", self.guid()),
        }
    }
}

/// Object returned by a method evaluation or an event-data fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcpiObject {
    Buffer(Vec<u8>),
    Integer(u64),
    String(String),
}

impl AcpiObject {
    /// Short type name for log lines
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
        }
    }

    pub fn as_buffer(&self) -> Option<&[u8]> {
        match self {
            Self::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Notification as delivered by the adapter, before decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNotification {
    /// Notify value passed to the handler
    pub value: u32,
    /// Event data; `None` when the firmware woke us without any
    pub payload: Option<AcpiObject>,
}

impl RawNotification {
    pub fn new(value: u32, payload: Option<AcpiObject>) -> Self {
        Self { value, payload }
    }

    /// Notification carrying a raw event buffer
    pub fn buffer(value: u32, bytes: Vec<u8>) -> Self {
        Self::new(value, Some(AcpiObject::Buffer(bytes)))
    }
}
