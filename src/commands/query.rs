//! Query (read-only) command handlers.

use super::CommandResult;
use hp_wmi::Session;
use hpwmi_platform::Attribute;

/// Show capabilities, switches, radios and attributes
pub fn info(session: &Session, json: bool) -> CommandResult {
    let report = session.report();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let caps = report.capabilities;
    println!("Interfaces:");
    println!("  Event:      {}", yes_no(caps.events));
    println!("  BIOS:       {}", yes_no(caps.bios));
    println!("  Firmware:   {}", firmware_era(caps.bios_2008, caps.bios_2009));
    println!("Switches:");
    println!("  Dock:       {}", yes_no(report.switches.dock));
    println!("  Tablet:     {}", yes_no(report.switches.tablet));

    match report.radio_mode {
        Some(mode) => println!("Radios ({:?}):", mode),
        None => println!("Radios:       none"),
    }
    for row in &report.radios {
        println!(
            "  {}: {:<14} soft={} hard={}",
            row.info.index, row.info.name, row.soft_blocked as u8, row.hard_blocked as u8
        );
    }

    println!("Four-zone:    {}", yes_no(report.fourzone));
    println!("Attributes:   {}", report.attributes.join(" "));
    Ok(())
}

/// Read one attribute, or every attribute
pub fn get(session: &Session, attr: Option<&str>) -> CommandResult {
    let platform = &session.platform;
    match attr {
        Some(name) => {
            let attr: Attribute = name.parse()?;
            print!("{}", platform.show(attr)?);
        }
        None => {
            for attr in platform.attributes() {
                match platform.show(attr) {
                    Ok(value) => print!("{:<10} {}", attr.to_string(), value),
                    Err(e) => println!("{:<10} <{}>", attr.to_string(), e),
                }
            }
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn firmware_era(bios_2008: bool, bios_2009: bool) -> &'static str {
    match (bios_2008, bios_2009) {
        (_, true) => "2009 or later",
        (true, false) => "2008",
        (false, false) => "pre-2008",
    }
}
