//! HP WMI platform diagnostics CLI
//!
//! Drives the platform layer against the firmware described by a machine
//! description file.

use clap::Parser;
use tracing_subscriber::EnvFilter;

// CLI definitions
mod cli;
use cli::{Cli, Commands, RfkillCommands, ZoneCommands};

// Command handlers
mod commands;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for target in ["hp_wmi", "hpwmi_platform", "hpwmi_transport"] {
        filter = filter.add_directive(format!("{target}={level}").parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Create printer config if monitoring is enabled
    let printer_config =
        commands::create_printer_config(cli.monitor, cli.hex, cli.filter.as_deref())?;
    let session = commands::open_session(cli.config.as_deref(), printer_config)?;

    match cli.command {
        None => commands::query::info(&session, false)?,

        Some(Commands::Info { json }) => commands::query::info(&session, json)?,
        Some(Commands::Get { attr }) => commands::query::get(&session, attr.as_deref())?,
        Some(Commands::Set { attr, value }) => commands::set::set(&session, &attr, &value)?,

        Some(Commands::Rfkill(RfkillCommands::List)) => commands::rfkill::list(&session)?,
        Some(Commands::Rfkill(RfkillCommands::Block { index })) => {
            commands::rfkill::set_blocked(&session, index, true)?
        }
        Some(Commands::Rfkill(RfkillCommands::Unblock { index })) => {
            commands::rfkill::set_blocked(&session, index, false)?
        }

        Some(Commands::Zone(ZoneCommands::Get { zone })) => commands::set::zone_get(&session, zone)?,
        Some(Commands::Zone(ZoneCommands::Set { zone, color })) => {
            commands::set::zone_set(&session, zone, &color)?
        }

        Some(Commands::Event { bytes, no_data }) => {
            commands::event::event(&session, &bytes, no_data)?
        }
        Some(Commands::Resume) => commands::event::resume(&session)?,
    }

    Ok(())
}
