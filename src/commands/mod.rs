//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `query`: Read-only commands (info, get)
//! - `set`: Attribute and zone writes (set, zone get/set)
//! - `rfkill`: Radio kill switches (list, block, unblock)
//! - `event`: Notification injection and the resume hook

pub mod event;
pub mod query;
pub mod rfkill;
pub mod set;

use std::path::Path;

use hp_wmi::{AppConfig, Session};
use hpwmi_platform::InputEvent;
use hpwmi_transport::{PacketFilter, PrinterConfig};
use tracing::debug;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Load the machine description and set up the platform on it
pub fn open_session(
    config_path: Option<&Path>,
    printer_config: Option<PrinterConfig>,
) -> anyhow::Result<Session> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::default_path);
    debug!("machine description: {}", path.display());
    let config = AppConfig::load(&path)?;
    Session::open(config, printer_config)
}

/// Create printer config from CLI flags
pub fn create_printer_config(
    monitor: bool,
    hex: bool,
    filter: Option<&str>,
) -> anyhow::Result<Option<PrinterConfig>> {
    if !monitor {
        return Ok(None);
    }

    let filter = match filter {
        Some(f) => f.parse::<PacketFilter>().map_err(anyhow::Error::msg)?,
        None => PacketFilter::All,
    };

    Ok(Some(
        PrinterConfig::default().with_hex(hex).with_filter(filter),
    ))
}

/// Print input events reported by the platform
pub fn print_input_events(events: &[InputEvent]) {
    for event in events {
        match event {
            InputEvent::Switch { switch, on } => {
                println!("  {:<12} {}", switch.name(), u8::from(*on))
            }
            InputEvent::Key { key, pressed } => {
                println!("  {:<12} {}", key.name(), if *pressed { "press" } else { "release" })
            }
            InputEvent::Sync => println!("  SYN_REPORT"),
        }
    }
}
