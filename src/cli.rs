// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hp_wmi")]
#[command(author, version, about = "HP WMI platform diagnostics")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Machine description (TOML with [platform] and [firmware] tables)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable transport monitoring (prints all queries/responses/events)
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Show raw hex dump alongside decoded output
    #[arg(long, global = true)]
    pub hex: bool,

    /// Filter output (all, events, queries, query=0xNN)
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show capabilities, switches, radios and attributes
    #[command(visible_alias = "i")]
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read an attribute (all attributes when omitted)
    Get {
        /// Attribute name (display, hddtemp, als, dock, tablet, postcode, zone00..zone03)
        attr: Option<String>,
    },

    /// Write an attribute
    Set {
        /// Attribute name (als, postcode, zone00..zone03)
        attr: String,
        /// Value in the attribute's text form
        value: String,
    },

    /// Radio kill switches
    #[command(subcommand)]
    Rfkill(RfkillCommands),

    /// Four-zone keyboard lighting
    #[command(subcommand)]
    Zone(ZoneCommands),

    /// Decode and dispatch an event notification buffer
    #[command(visible_alias = "ev")]
    Event {
        /// Buffer bytes in hex (8 or 16 bytes, e.g. 0400000000000000)
        bytes: Vec<String>,
        /// Deliver the notification without event data
        #[arg(long, conflicts_with = "bytes")]
        no_data: bool,
    },

    /// Run the resume hook (re-report switches and radios)
    Resume,
}

#[derive(Subcommand)]
pub enum RfkillCommands {
    /// List registered radios
    #[command(visible_alias = "ls")]
    List,

    /// Soft-block a radio
    Block {
        /// Radio index (see `rfkill list`)
        index: usize,
    },

    /// Clear a radio's soft block
    Unblock {
        /// Radio index (see `rfkill list`)
        index: usize,
    },
}

#[derive(Subcommand)]
pub enum ZoneCommands {
    /// Show one zone's colour
    Get {
        /// Zone (0-3)
        #[arg(value_parser = clap::value_parser!(u8).range(0..4))]
        zone: u8,
    },

    /// Set one zone's colour
    Set {
        /// Zone (0-3)
        #[arg(value_parser = clap::value_parser!(u8).range(0..4))]
        zone: u8,
        /// Colour as 24-bit hex (e.g. FF8000 or 0xff8000)
        color: String,
    },
}
