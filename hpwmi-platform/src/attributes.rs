//! Attribute surface (one text value per attribute, sysfs style)

use std::fmt;
use std::str::FromStr;

use hpwmi_transport::protocol::{hardware, query};
use hpwmi_transport::{BiosCommand, BiosQuery};

use crate::error::PlatformError;
use crate::zone::{ZoneColor, ZONE_COUNT};
use crate::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Display,
    HddTemp,
    Als,
    Dock,
    Tablet,
    PostCode,
    Zone(u8),
}

impl Attribute {
    /// Attributes present on every machine
    pub const BASE: [Self; 6] = [
        Self::Display,
        Self::HddTemp,
        Self::Als,
        Self::Dock,
        Self::Tablet,
        Self::PostCode,
    ];

    pub fn is_writable(&self) -> bool {
        matches!(self, Self::Als | Self::PostCode | Self::Zone(_))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Display => f.write_str("display"),
            Self::HddTemp => f.write_str("hddtemp"),
            Self::Als => f.write_str("als"),
            Self::Dock => f.write_str("dock"),
            Self::Tablet => f.write_str("tablet"),
            Self::PostCode => f.write_str("postcode"),
            Self::Zone(zone) => write!(f, "zone{:02X}", zone),
        }
    }
}

impl FromStr for Attribute {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "display" => Ok(Self::Display),
            "hddtemp" => Ok(Self::HddTemp),
            "als" => Ok(Self::Als),
            "dock" => Ok(Self::Dock),
            "tablet" => Ok(Self::Tablet),
            "postcode" => Ok(Self::PostCode),
            _ => s
                .strip_prefix("zone")
                .and_then(|n| u8::from_str_radix(n, 16).ok())
                .filter(|zone| usize::from(*zone) < ZONE_COUNT)
                .map(Self::Zone)
                .ok_or_else(|| PlatformError::InvalidParameter(format!("unknown attribute {:?}", s))),
        }
    }
}

/// Leading decimal digits, 0 if none (`simple_strtoul` semantics)
fn parse_leading_decimal(s: &str) -> u32 {
    s.trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, d| acc.wrapping_mul(10).wrapping_add(u32::from(d - b'0')))
}

impl Platform {
    /// Attributes this machine exposes
    pub fn attributes(&self) -> Vec<Attribute> {
        let mut attrs = Attribute::BASE.to_vec();
        if self.fourzone {
            attrs.extend((0..ZONE_COUNT as u8).map(Attribute::Zone));
        }
        attrs
    }

    /// Render an attribute's current value
    pub fn show(&self, attr: Attribute) -> Result<String, PlatformError> {
        let value = match attr {
            Attribute::Zone(zone) => self.zone(usize::from(zone))?.describe(),
            Attribute::Display => self.with_transport(|t| t.read_int(query::DISPLAY))?.to_string(),
            Attribute::HddTemp => self.with_transport(|t| t.read_int(query::HDDTEMP))?.to_string(),
            Attribute::Als => self.with_transport(|t| t.read_int(query::ALS))?.to_string(),
            Attribute::Dock => {
                u8::from(self.with_transport(|t| t.hw_state(hardware::DOCK))?).to_string()
            }
            Attribute::Tablet => {
                u8::from(self.with_transport(|t| t.hw_state(hardware::TABLET))?).to_string()
            }
            Attribute::PostCode => format!(
                "0x{:x}",
                self.with_transport(|t| t.read_int(query::POSTCODEERROR))?
            ),
        };
        Ok(format!("{}\n", value))
    }

    /// Write an attribute from its text form
    pub fn store(&self, attr: Attribute, value: &str) -> Result<(), PlatformError> {
        match attr {
            Attribute::Als => {
                let als = parse_leading_decimal(value);
                self.with_transport(|t| {
                    t.perform_query(query::ALS, BiosCommand::Write, &als.to_le_bytes(), &mut [0u8; 4])
                })?;
                Ok(())
            }
            Attribute::PostCode => {
                let text = value.strip_suffix('\n').unwrap_or(value);
                let code: u64 = text.parse().map_err(|e| {
                    PlatformError::InvalidParameter(format!("postcode {:?}: {}", text, e))
                })?;
                if code != 1 {
                    return Err(PlatformError::InvalidParameter(
                        "postcode accepts only 1 (clear)".into(),
                    ));
                }
                self.with_transport(|t| {
                    t.perform_query(
                        query::POSTCODEERROR,
                        BiosCommand::Write,
                        &1u32.to_le_bytes(),
                        &mut [0u8; 4],
                    )
                })?;
                Ok(())
            }
            Attribute::Zone(zone) => {
                let color: ZoneColor = value.parse()?;
                self.set_zone(usize::from(zone), color)
            }
            _ => Err(PlatformError::NotSupported(format!("{} is read-only", attr))),
        }
    }
}
