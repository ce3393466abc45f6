//! Setting command handlers.

use super::CommandResult;
use hp_wmi::Session;
use hpwmi_platform::{Attribute, ZoneColor};

/// Write an attribute from its text form
pub fn set(session: &Session, attr: &str, value: &str) -> CommandResult {
    let attr: Attribute = attr.parse()?;
    session.platform.store(attr, value)?;
    println!("{} set to {}", attr, value.trim());
    Ok(())
}

/// Show one zone's colour
pub fn zone_get(session: &Session, zone: u8) -> CommandResult {
    let color = session.platform.zone(usize::from(zone))?;
    println!("Zone {}: #{} ({})", zone, color, color.describe());
    Ok(())
}

/// Set one zone's colour
pub fn zone_set(session: &Session, zone: u8, color: &str) -> CommandResult {
    let color: ZoneColor = color.parse()?;
    session.platform.set_zone(usize::from(zone), color)?;
    println!("Zone {} set to #{}", zone, color);
    Ok(())
}
