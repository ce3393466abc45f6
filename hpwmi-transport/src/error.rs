//! Transport, query and decode error types

use thiserror::Error;

use crate::protocol::ReturnCode;
use crate::types::InterfaceId;

/// Errors raised by the method-invocation adapter itself
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Interface not present: {0}")]
    InterfaceMissing(InterfaceId),

    #[error("No response object from method {method}")]
    NoResponse { method: u32 },

    #[error("Unexpected response object: {0}")]
    UnexpectedObject(&'static str),

    #[error("Malformed response envelope: {len} bytes")]
    MalformedEnvelope { len: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors from a single BIOS query round trip
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Adapter returned nothing usable
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Firmware answered with a non-zero return code
    #[error("Firmware returned {0}")]
    Firmware(ReturnCode),

    /// Input payload does not fit the 128-byte request data field
    #[error("Input size {size} exceeds request data field")]
    InputTooLarge { size: usize },

    /// Output size has no method selector
    #[error("Output size {size} exceeds largest method class")]
    OutputTooLarge { size: usize },
}

impl QueryError {
    /// Firmware return code, if the firmware answered at all
    pub fn return_code(&self) -> Option<ReturnCode> {
        match self {
            Self::Firmware(code) => Some(*code),
            _ => None,
        }
    }

    /// True when the firmware does not implement the query family
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Firmware(ReturnCode::UnknownCommandType))
    }
}

/// Errors while decoding firmware-provided buffers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unexpected notification buffer length {0}")]
    NotificationLength(usize),

    #[error("Notification payload is not a buffer: {0}")]
    NotABuffer(&'static str),

    #[error("Buffer too short: expected {expected} bytes, got {got}")]
    TooShort { expected: usize, got: usize },

    #[error("Device count {count} exceeds capacity {max}")]
    TooManyDevices { count: usize, max: usize },
}
