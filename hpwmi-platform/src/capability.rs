//! Startup capability probing

use serde::Serialize;
use tracing::{debug, warn};

use hpwmi_transport::protocol::{query, HOTKEY_ENABLE};
use hpwmi_transport::{BiosCommand, BiosQuery, InterfaceId, QueryError, Transport};

use crate::error::PlatformError;

/// What the firmware turned out to support
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Event interface present
    pub events: bool,
    /// BIOS query interface present
    pub bios: bool,
    /// Feature marker answered (2008 or later firmware)
    pub bios_2008: bool,
    /// Feature2 marker answered (2009 or later firmware)
    pub bios_2009: bool,
}

impl Capabilities {
    /// Check interfaces and, with a BIOS interface, probe both markers
    pub fn probe<T: Transport + ?Sized>(transport: &T) -> Result<Self, PlatformError> {
        let events = transport.has_interface(InterfaceId::Event);
        let bios = transport.has_interface(InterfaceId::Bios);
        if !events && !bios {
            return Err(PlatformError::NoInterface);
        }

        let mut caps = Self {
            events,
            bios,
            ..Default::default()
        };
        if bios {
            caps.bios_2008 = probe_marker(transport, query::FEATURE, 4);
            caps.bios_2009 = probe_marker(transport, query::FEATURE2, 128);
        }
        debug!("capabilities: {:?}", caps);
        Ok(caps)
    }

    /// 2008-era firmware needs hotkeys switched on explicitly
    pub fn needs_hotkey_enable(&self) -> bool {
        self.bios_2008 && !self.bios_2009
    }
}

fn probe_marker<T: Transport + ?Sized>(transport: &T, marker: u32, size: usize) -> bool {
    let input = vec![0u8; size];
    let mut output = vec![0u8; size];
    match transport.perform_query(marker, BiosCommand::Read, &input, &mut output) {
        Ok(()) => true,
        Err(e) if e.is_unsupported() => false,
        Err(e) => {
            warn!("marker query 0x{:x} failed: {}", marker, e);
            false
        }
    }
}

/// Write the hotkey enable value to the BIOS query
pub fn enable_hotkeys<T: Transport + ?Sized>(transport: &T) -> Result<(), QueryError> {
    transport.write_int(query::BIOS, HOTKEY_ENABLE)
}
