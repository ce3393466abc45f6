//! Four-zone keyboard lighting
//!
//! The firmware keeps all lighting state in one 128-byte blob with no
//! per-zone addressing. Each zone's colour is three bytes (red, green, blue)
//! at `25 + 3 * zone`. Every other byte is opaque and written back as read.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use hpwmi_transport::protocol::fourzone;
use hpwmi_transport::{BiosCommand, BiosQuery, Transport};

use crate::error::PlatformError;

/// Number of lighting zones
pub const ZONE_COUNT: usize = 4;

/// Offset of zone 0 in the blob
pub const ZONE_BASE_OFFSET: usize = 25;

/// Largest packed 24-bit colour
pub const MAX_PACKED_COLOR: u32 = 0xFF_FFFF;

/// Blob offset of a zone's red byte
pub fn zone_offset(zone: usize) -> Result<usize, PlatformError> {
    if zone >= ZONE_COUNT {
        return Err(PlatformError::InvalidParameter(format!(
            "zone {} (max {})",
            zone,
            ZONE_COUNT - 1
        )));
    }
    Ok(ZONE_BASE_OFFSET + 3 * zone)
}

/// Zone colour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ZoneColor {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Unpack `0xRRGGBB`
    pub fn from_packed(rgb: u32) -> Result<Self, PlatformError> {
        if rgb > MAX_PACKED_COLOR {
            return Err(PlatformError::InvalidParameter(format!(
                "colour 0x{:x} exceeds 24 bits",
                rgb
            )));
        }
        Ok(Self {
            red: (rgb >> 16) as u8,
            green: (rgb >> 8) as u8,
            blue: rgb as u8,
        })
    }

    /// Pack as `0xRRGGBB`
    pub fn packed(&self) -> u32 {
        (u32::from(self.red) << 16) | (u32::from(self.green) << 8) | u32::from(self.blue)
    }

    /// Attribute rendering: `red: R, green: G, blue: B`
    pub fn describe(&self) -> String {
        format!("red: {}, green: {}, blue: {}", self.red, self.green, self.blue)
    }

    fn extract(blob: &[u8; fourzone::BLOB_SIZE], offset: usize) -> Self {
        Self::new(blob[offset], blob[offset + 1], blob[offset + 2])
    }

    fn overlay(&self, blob: &mut [u8; fourzone::BLOB_SIZE], offset: usize) {
        blob[offset..offset + 3].copy_from_slice(&[self.red, self.green, self.blue]);
    }
}

impl FromStr for ZoneColor {
    type Err = PlatformError;

    /// Parse 24-bit hex, with or without a `0x` prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let rgb = u32::from_str_radix(hex, 16)
            .map_err(|e| PlatformError::InvalidParameter(format!("colour {:?}: {}", s, e)))?;
        Self::from_packed(rgb)
    }
}

impl fmt::Display for ZoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

/// Fetch the whole lighting blob
pub fn read_blob<T: Transport + ?Sized>(
    transport: &T,
) -> Result<[u8; fourzone::BLOB_SIZE], PlatformError> {
    let mut blob = [0u8; fourzone::BLOB_SIZE];
    transport
        .perform_query(
            fourzone::COLOR_GET,
            BiosCommand::FourZone,
            &[0u8; fourzone::BLOB_SIZE],
            &mut blob,
        )
        .inspect_err(|e| warn!("fourzone_color_get failed: {}", e))?;
    Ok(blob)
}

pub fn read_zone<T: Transport + ?Sized>(
    transport: &T,
    zone: usize,
) -> Result<ZoneColor, PlatformError> {
    let offset = zone_offset(zone)?;
    let blob = read_blob(transport)?;
    Ok(ZoneColor::extract(&blob, offset))
}

/// Read-modify-write one zone's colour
pub fn write_zone<T: Transport + ?Sized>(
    transport: &T,
    zone: usize,
    color: ZoneColor,
) -> Result<(), PlatformError> {
    let offset = zone_offset(zone)?;
    let mut blob = read_blob(transport)?;
    color.overlay(&mut blob, offset);

    let mut echo = [0u8; fourzone::BLOB_SIZE];
    transport
        .perform_query(fourzone::COLOR_SET, BiosCommand::FourZone, &blob, &mut echo)
        .inspect_err(|e| warn!("fourzone_color_set failed: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpwmi_transport::{EmulatedFirmware, EmulatedFirmwareConfig};

    #[test]
    fn test_zone_offsets() {
        let offsets: Vec<usize> = (0..ZONE_COUNT).map(|z| zone_offset(z).unwrap()).collect();
        assert_eq!(offsets, vec![25, 28, 31, 34]);
        assert!(zone_offset(4).is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        let color: ZoneColor = "FF8000".parse().unwrap();
        assert_eq!(color, ZoneColor::new(0xFF, 0x80, 0x00));
        assert!(color.to_string().eq_ignore_ascii_case("ff8000"));

        let color: ZoneColor = " 0x00ff7f\n".parse().unwrap();
        assert_eq!(color, ZoneColor::new(0x00, 0xFF, 0x7F));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(
            "1000000".parse::<ZoneColor>(),
            Err(PlatformError::InvalidParameter(_))
        ));
        assert!("zz".parse::<ZoneColor>().is_err());
        assert!(ZoneColor::from_packed(0xFF_FFFF).is_ok());
    }

    #[test]
    fn test_pack_unpack() {
        let color = ZoneColor::from_packed(0x123456).unwrap();
        assert_eq!((color.red, color.green, color.blue), (0x12, 0x34, 0x56));
        assert_eq!(color.packed(), 0x123456);
        assert_eq!(color.describe(), "red: 18, green: 52, blue: 86");
    }

    #[test]
    fn test_write_preserves_other_bytes() {
        let mut blob = vec![0xEE; 128];
        blob[25..37].fill(0);
        let firmware = EmulatedFirmware::new(EmulatedFirmwareConfig {
            fourzone: Some(blob),
            ..Default::default()
        });

        write_zone(&firmware, 2, ZoneColor::new(1, 2, 3)).unwrap();
        let blob = firmware.state().fourzone.unwrap();
        assert_eq!(&blob[31..34], &[1, 2, 3]);
        assert_eq!(blob[0], 0xEE);
        assert_eq!(blob[127], 0xEE);
        assert_eq!(&blob[25..31], &[0; 6]);

        assert_eq!(read_zone(&firmware, 2).unwrap(), ZoneColor::new(1, 2, 3));
    }

    #[test]
    fn test_invalid_zone_never_reaches_firmware() {
        let firmware = EmulatedFirmware::new(EmulatedFirmwareConfig::default());
        assert!(read_zone(&firmware, 7).is_err());
        assert!(firmware.queries().is_empty());
    }
}
