//! Protocol constants for the HP WMI BIOS interface

use std::fmt;

use crate::error::QueryError;

/// Magic carried in every request (`"SECU"` little-endian)
pub const SIGNATURE: u32 = 0x5543_4553;

/// Size of the request data field
pub const REQUEST_DATA_SIZE: usize = 128;

/// Size of the request header preceding the data field
pub const REQUEST_HEADER_SIZE: usize = 16;

/// Total request size on the wire
pub const REQUEST_SIZE: usize = REQUEST_HEADER_SIZE + REQUEST_DATA_SIZE;

/// Size of the response envelope (sigpass + return code)
pub const RESPONSE_HEADER_SIZE: usize = 8;

/// Largest output size any method class can carry
pub const MAX_OUTPUT_SIZE: usize = 4096;

/// Request command field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BiosCommand {
    Read = 0x01,
    Write = 0x02,
    Odm = 0x03,
    /// Keyboard lighting family, addressed by its own query ids
    FourZone = 131_081,
}

impl BiosCommand {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0x01 => Some(Self::Read),
            0x02 => Some(Self::Write),
            0x03 => Some(Self::Odm),
            131_081 => Some(Self::FourZone),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Odm => "ODM",
            Self::FourZone => "FOURZONE",
        }
    }
}

/// Query families (request `commandtype` field) for READ/WRITE
pub mod query {
    pub const DISPLAY: u32 = 0x01;
    pub const HDDTEMP: u32 = 0x02;
    pub const ALS: u32 = 0x03;
    pub const HARDWARE: u32 = 0x04;
    pub const WIRELESS: u32 = 0x05;
    pub const BATTERY: u32 = 0x07;
    pub const BIOS: u32 = 0x09;
    pub const FEATURE: u32 = 0x0B;
    pub const HOTKEY: u32 = 0x0C;
    pub const FEATURE2: u32 = 0x0D;
    pub const WIRELESS2: u32 = 0x1B;
    pub const POSTCODEERROR: u32 = 0x2A;

    /// Get human-readable name for a query family
    pub fn name(query: u32) -> &'static str {
        match query {
            DISPLAY => "DISPLAY",
            HDDTEMP => "HDDTEMP",
            ALS => "ALS",
            HARDWARE => "HARDWARE",
            WIRELESS => "WIRELESS",
            BATTERY => "BATTERY",
            BIOS => "BIOS",
            FEATURE => "FEATURE",
            HOTKEY => "HOTKEY",
            FEATURE2 => "FEATURE2",
            WIRELESS2 => "WIRELESS2",
            POSTCODEERROR => "POSTCODEERROR",
            _ => "UNKNOWN",
        }
    }
}

/// Query ids used with [`BiosCommand::FourZone`]
pub mod fourzone {
    pub const COLOR_GET: u32 = 2;
    pub const COLOR_SET: u32 = 3;
    pub const BRIGHT_GET: u32 = 4;
    pub const BRIGHT_SET: u32 = 5;
    pub const ANIM_GET: u32 = 6;
    pub const ANIM_SET: u32 = 7;

    /// Size of the lighting state blob
    pub const BLOB_SIZE: usize = 128;

    pub fn name(query: u32) -> &'static str {
        match query {
            COLOR_GET => "COLOR_GET",
            COLOR_SET => "COLOR_SET",
            BRIGHT_GET => "BRIGHT_GET",
            BRIGHT_SET => "BRIGHT_SET",
            ANIM_GET => "ANIM_GET",
            ANIM_SET => "ANIM_SET",
            _ => "UNKNOWN",
        }
    }
}

/// Human-readable name for a (command, query) pair
pub fn query_name(command: BiosCommand, query: u32) -> &'static str {
    match command {
        BiosCommand::FourZone => fourzone::name(query),
        _ => query::name(query),
    }
}

/// Bits of the hardware query result
pub mod hardware {
    pub const DOCK: u32 = 0x01;
    pub const TABLET: u32 = 0x04;
}

/// Value written to the BIOS query to switch on hotkey notifications
pub const HOTKEY_ENABLE: u32 = 0x6E;

/// Firmware return codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    WrongSignature,
    UnknownCommand,
    UnknownCommandType,
    InputSizeNull,
    InputDataNull,
    InputDataInvalid,
    ReturnSizeNull,
    ReturnSizeInvalid,
    Other(u32),
}

impl ReturnCode {
    /// Classify a non-zero code from the response envelope
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0x02 => Self::WrongSignature,
            0x03 => Self::UnknownCommand,
            0x04 => Self::UnknownCommandType,
            0x05 => Self::InputSizeNull,
            0x06 => Self::InputDataNull,
            0x07 => Self::InputDataInvalid,
            0x08 => Self::ReturnSizeNull,
            0x09 => Self::ReturnSizeInvalid,
            other => Self::Other(other),
        }
    }

    pub fn raw(&self) -> u32 {
        match self {
            Self::WrongSignature => 0x02,
            Self::UnknownCommand => 0x03,
            Self::UnknownCommandType => 0x04,
            Self::InputSizeNull => 0x05,
            Self::InputDataNull => 0x06,
            Self::InputDataInvalid => 0x07,
            Self::ReturnSizeNull => 0x08,
            Self::ReturnSizeInvalid => 0x09,
            Self::Other(raw) => *raw,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::WrongSignature => "WRONG_SIGNATURE",
            Self::UnknownCommand => "UNKNOWN_COMMAND",
            Self::UnknownCommandType => "UNKNOWN_CMDTYPE",
            Self::InputSizeNull => "INPUT_SIZE_NULL",
            Self::InputDataNull => "INPUT_DATA_NULL",
            Self::InputDataInvalid => "INPUT_DATA_INVALID",
            Self::ReturnSizeNull => "RETURN_SIZE_NULL",
            Self::ReturnSizeInvalid => "RETURN_SIZE_INVALID",
            Self::Other(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x} ({})", self.raw(), self.name())
    }
}

/// Map an output size to the WMI method id of its size class.
///
/// | size      | method |
/// |-----------|--------|
/// | 0         | 1      |
/// | 1..=4     | 2      |
/// | 5..=128   | 3      |
/// | 129..=1024| 4      |
/// | 1025..=4096 | 5    |
pub fn method_for_output_size(outsize: usize) -> Result<u32, QueryError> {
    match outsize {
        0 => Ok(1),
        1..=4 => Ok(2),
        5..=128 => Ok(3),
        129..=1024 => Ok(4),
        1025..=MAX_OUTPUT_SIZE => Ok(5),
        size => Err(QueryError::OutputTooLarge { size }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_selector_boundaries() {
        let expected = [
            (0, 1),
            (1, 2),
            (4, 2),
            (5, 3),
            (128, 3),
            (129, 4),
            (1024, 4),
            (1025, 5),
            (4096, 5),
        ];
        for (size, method) in expected {
            assert_eq!(method_for_output_size(size), Ok(method), "size {size}");
        }
        assert_eq!(
            method_for_output_size(4097),
            Err(QueryError::OutputTooLarge { size: 4097 })
        );
    }

    #[test]
    fn test_return_code_classification() {
        assert_eq!(ReturnCode::from_raw(4), ReturnCode::UnknownCommandType);
        assert_eq!(ReturnCode::from_raw(0x42), ReturnCode::Other(0x42));
        for raw in 2..=9 {
            assert_eq!(ReturnCode::from_raw(raw).raw(), raw);
        }
        assert_eq!(ReturnCode::WrongSignature.to_string(), "0x2 (WRONG_SIGNATURE)");
    }

    #[test]
    fn test_signature_spells_secu() {
        assert_eq!(&SIGNATURE.to_le_bytes(), b"SECU");
    }

    #[test]
    fn test_query_names() {
        assert_eq!(query_name(BiosCommand::Read, query::WIRELESS2), "WIRELESS2");
        assert_eq!(query_name(BiosCommand::FourZone, fourzone::COLOR_SET), "COLOR_SET");
        assert_eq!(BiosCommand::from_u32(131_081), Some(BiosCommand::FourZone));
    }
}
