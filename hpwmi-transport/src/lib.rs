//! Transport abstraction layer for the HP WMI firmware interfaces
//!
//! This crate owns everything between the platform logic and the firmware:
//!
//! - The [`Transport`] trait, an opaque synchronous method invocation on one
//!   of the two WMI interfaces (BIOS queries, event notifications)
//! - The 140-byte request / enveloped response codec and method selector
//! - Event notification buffer decoding
//! - A monitoring middleware ([`PrinterTransport`])
//! - An in-memory firmware model ([`EmulatedFirmware`])

pub mod command;
pub mod emulated;
pub mod error;
pub mod event_parser;
pub mod printer;
pub mod protocol;
pub mod types;

pub use command::{
    decode_response, encode_response, power, BiosArgs, BiosQuery, BiosReturn, Wireless2Device,
    Wireless2State, MAX_WIRELESS2_DEVICES,
};
pub use emulated::{
    EmulatedFirmware, EmulatedFirmwareConfig, EmulatedRadio, InjectedError, RecordedQuery,
};
pub use error::{DecodeError, QueryError, TransportError};
pub use event_parser::{parse_event_buffer, parse_notification, EventId, Notification};
pub use printer::{PacketFilter, PrinterConfig, PrinterTransport};
pub use protocol::{method_for_output_size, BiosCommand, ReturnCode};
pub use types::{AcpiObject, InterfaceId, RawNotification};

use std::sync::Arc;
use tokio::sync::broadcast;

/// The core transport trait - all backends implement this
///
/// Calls block until the firmware answers. Interface discovery is the
/// backend's business; the platform only asks whether an interface exists.
pub trait Transport: Send + Sync {
    /// Evaluate method `method_id` of `interface` with `input` as argument
    ///
    /// # Returns
    /// The object the method returned, or `None` if it returned nothing
    fn evaluate_method(
        &self,
        interface: InterfaceId,
        instance: u8,
        method_id: u32,
        input: &[u8],
    ) -> Result<Option<AcpiObject>, TransportError>;

    /// Check whether the firmware publishes `interface`
    fn has_interface(&self, interface: InterfaceId) -> bool;

    /// Subscribe to event notifications via broadcast channel
    ///
    /// Returns None if the transport doesn't deliver notifications.
    fn subscribe_notifications(&self) -> Option<broadcast::Receiver<RawNotification>> {
        None // Default: not supported
    }
}

/// Type alias for a shared transport
pub type BoxedTransport = Arc<dyn Transport>;
