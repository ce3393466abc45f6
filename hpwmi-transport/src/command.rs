//! BIOS query request/response codec
//!
//! Every firmware query is a fixed 140-byte request:
//!
//! ```text
//! [signature:4][command:4][commandtype:4][datasize:4][data:128]
//! ```
//!
//! answered by an envelope followed by the output bytes:
//!
//! ```text
//! [sigpass:4][return_code:4][output:N]
//! ```
//!
//! All integers are little-endian. The method id used for the evaluation
//! encodes the size class of the expected output (see
//! [`protocol::method_for_output_size`]).

use tracing::{debug, warn};
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::{DecodeError, QueryError, TransportError};
use crate::protocol::{
    self, query, BiosCommand, ReturnCode, REQUEST_DATA_SIZE, REQUEST_SIZE, RESPONSE_HEADER_SIZE,
    SIGNATURE,
};
use crate::types::InterfaceId;
use crate::Transport;

// =============================================================================
// Request
// =============================================================================

/// Request buffer passed to the BIOS interface
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct BiosArgs {
    signature: U32,
    command: U32,
    commandtype: U32,
    datasize: U32,
    data: [u8; REQUEST_DATA_SIZE],
}

impl BiosArgs {
    /// Build a request carrying `input` at the start of the data field.
    ///
    /// Unused data bytes are zero. Inputs larger than the data field are
    /// rejected before anything is built.
    pub fn new(command: BiosCommand, query: u32, input: &[u8]) -> Result<Self, QueryError> {
        if input.len() > REQUEST_DATA_SIZE {
            return Err(QueryError::InputTooLarge { size: input.len() });
        }
        let mut data = [0u8; REQUEST_DATA_SIZE];
        data[..input.len()].copy_from_slice(input);
        Ok(Self {
            signature: U32::new(SIGNATURE),
            command: U32::new(command as u32),
            commandtype: U32::new(query),
            datasize: U32::new(input.len() as u32),
            data,
        })
    }

    /// Parse a request from its wire form (emulators, monitors)
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::read_from_bytes(bytes).map_err(|_| DecodeError::TooShort {
            expected: REQUEST_SIZE,
            got: bytes.len(),
        })
    }

    pub fn signature(&self) -> u32 {
        self.signature.get()
    }

    /// Raw command field
    pub fn command(&self) -> u32 {
        self.command.get()
    }

    pub fn commandtype(&self) -> u32 {
        self.commandtype.get()
    }

    /// Declared input size
    pub fn datasize(&self) -> u32 {
        self.datasize.get()
    }

    /// The whole 128-byte data field
    pub fn data(&self) -> &[u8; REQUEST_DATA_SIZE] {
        &self.data
    }

    /// Data bytes covered by the declared size
    pub fn input(&self) -> &[u8] {
        let len = (self.datasize() as usize).min(REQUEST_DATA_SIZE);
        &self.data[..len]
    }

    /// First data word, the argument of integer queries
    pub fn input_u32(&self) -> u32 {
        u32::from_le_bytes([self.data[0], self.data[1], self.data[2], self.data[3]])
    }
}

// =============================================================================
// Response
// =============================================================================

/// Response envelope preceding the output bytes
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct BiosReturn {
    sigpass: U32,
    return_code: U32,
}

impl BiosReturn {
    pub fn sigpass(&self) -> u32 {
        self.sigpass.get()
    }

    /// Raw return code; zero is success
    pub fn return_code(&self) -> u32 {
        self.return_code.get()
    }
}

/// Split a response buffer into its envelope and output bytes
pub fn decode_response(bytes: &[u8]) -> Result<(BiosReturn, &[u8]), TransportError> {
    BiosReturn::read_from_prefix(bytes)
        .map_err(|_| TransportError::MalformedEnvelope { len: bytes.len() })
}

/// Build a response buffer (emulators)
pub fn encode_response(return_code: u32, output: &[u8]) -> Vec<u8> {
    let header = BiosReturn {
        sigpass: U32::new(0),
        return_code: U32::new(return_code),
    };
    let mut buf = Vec::with_capacity(RESPONSE_HEADER_SIZE + output.len());
    buf.extend_from_slice(header.as_bytes());
    buf.extend_from_slice(output);
    buf
}

// =============================================================================
// Enumerated wireless state (query 0x1B)
// =============================================================================

/// Maximum devices the 128-byte wireless2 buffer can describe
pub const MAX_WIRELESS2_DEVICES: usize = 7;

/// Per-device record in the wireless2 buffer (16 bytes)
#[derive(Debug, Clone, Copy, Default, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct Wireless2Device {
    pub radio_type: u8,
    pub bus_type: u8,
    pub vendor_id: U16,
    pub product_id: U16,
    pub subsys_vendor_id: U16,
    pub subsys_product_id: U16,
    pub rfkill_id: u8,
    pub power: u8,
    pub unknown: [u8; 4],
}

/// Whole wireless2 buffer (128 bytes)
#[derive(Debug, Clone, Copy, Default, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct Wireless2State {
    pub unknown: [u8; 7],
    pub count: u8,
    pub pad: [u8; 8],
    pub device: [Wireless2Device; MAX_WIRELESS2_DEVICES],
}

impl Wireless2State {
    /// Size on the wire
    pub const SIZE: usize = 128;

    /// Parse the buffer, validating total length first
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::read_from_bytes(bytes).map_err(|_| DecodeError::TooShort {
            expected: Self::SIZE,
            got: bytes.len(),
        })
    }
}

/// `power` bits of a [`Wireless2Device`]
pub mod power {
    pub const STATE: u8 = 0x01;
    pub const SOFT: u8 = 0x02;
    pub const BIOS: u8 = 0x04;
    pub const HARD: u8 = 0x08;
}

// =============================================================================
// Query execution
// =============================================================================

/// Query helpers available on every transport
pub trait BiosQuery {
    /// Run one query against the BIOS interface.
    ///
    /// `input` is copied into the request data field and `output.len()`
    /// selects the method class. On success `output` is filled from the
    /// response, zero-padded when the firmware returned fewer bytes. On a
    /// firmware error `output` is left untouched.
    fn perform_query(
        &self,
        query: u32,
        command: BiosCommand,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(), QueryError>;

    /// Read a 32-bit value
    fn read_int(&self, query: u32) -> Result<u32, QueryError> {
        let input = 0u32.to_le_bytes();
        let mut output = [0u8; 4];
        self.perform_query(query, BiosCommand::Read, &input, &mut output)?;
        Ok(u32::from_le_bytes(output))
    }

    /// Write a 32-bit value, discarding any output
    fn write_int(&self, query: u32, value: u32) -> Result<(), QueryError> {
        self.perform_query(query, BiosCommand::Write, &value.to_le_bytes(), &mut [])
    }

    /// Test bits of the hardware query result
    fn hw_state(&self, mask: u32) -> Result<bool, QueryError> {
        Ok(self.read_int(query::HARDWARE)? & mask != 0)
    }
}

impl<T: Transport + ?Sized> BiosQuery for T {
    fn perform_query(
        &self,
        query: u32,
        command: BiosCommand,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(), QueryError> {
        let method = protocol::method_for_output_size(output.len()).inspect_err(|_| {
            warn!("query 0x{:x}: output size {} has no method", query, output.len());
        })?;
        let args = BiosArgs::new(command, query, input).inspect_err(|_| {
            warn!("query 0x{:x}: input size {} too large", query, input.len());
        })?;

        let object = self
            .evaluate_method(InterfaceId::Bios, 0, method, args.as_bytes())?
            .ok_or(TransportError::NoResponse { method })?;
        let bytes = object
            .as_buffer()
            .ok_or_else(|| TransportError::UnexpectedObject(object.type_name()))?;

        let (envelope, payload) = decode_response(bytes)?;
        let raw = envelope.return_code();
        if raw != 0 {
            let code = ReturnCode::from_raw(raw);
            if code == ReturnCode::UnknownCommandType {
                debug!("query 0x{:x} not supported by firmware", query);
            } else {
                warn!("query 0x{:x} returned error {}", query, code);
            }
            return Err(QueryError::Firmware(code));
        }

        if output.is_empty() {
            return Ok(());
        }

        let actual = output.len().min(payload.len());
        output[..actual].copy_from_slice(&payload[..actual]);
        output[actual..].fill(0);
        Ok(())
    }
}
