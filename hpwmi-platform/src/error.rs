//! Platform error types

use hpwmi_transport::{DecodeError, QueryError};
use thiserror::Error;

/// Errors from platform operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Query round trip failed (transport or firmware)
    #[error("Query failed: {0}")]
    Query(#[from] QueryError),

    /// Firmware buffer could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Neither the event nor the BIOS interface is present
    #[error("No HP WMI interface present")]
    NoInterface,

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Feature not supported by this machine
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// No radio registered at this index
    #[error("No radio at index {0}")]
    UnknownRadio(usize),
}
