//! PrinterTransport middleware for monitoring firmware traffic
//!
//! Wraps any Transport implementation and prints every BIOS query, its
//! response envelope and every event notification passing through it.
//!
//! # Example
//!
//! ```ignore
//! use hpwmi_transport::{EmulatedFirmware, PrinterConfig, PrinterTransport};
//!
//! let firmware = Arc::new(EmulatedFirmware::new(Default::default()));
//! let monitored = PrinterTransport::wrap(firmware, PrinterConfig::default().with_hex(true));
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::thread;

use crossterm::style::Stylize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::command::{decode_response, BiosArgs};
use crate::event_parser::parse_notification;
use crate::protocol::{query_name, BiosCommand, ReturnCode};
use crate::{AcpiObject, InterfaceId, RawNotification, Transport, TransportError};

/// Capacity of the re-broadcast channel for printed notifications
const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

/// Packet filter for selective display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PacketFilter {
    #[default]
    All,
    Events,
    Queries,
    Query(u32),
}

impl FromStr for PacketFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "events" | "event" => Ok(Self::Events),
            "queries" | "query" => Ok(Self::Queries),
            s if s.starts_with("query=") || s.starts_with("0x") => {
                let hex_str = s.strip_prefix("query=").unwrap_or(s);
                let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
                u32::from_str_radix(hex_str, 16)
                    .map(Self::Query)
                    .map_err(|e| format!("Invalid query id: {}", e))
            }
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

/// Configuration for the PrinterTransport
#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    /// Show raw hex dump alongside decoded output
    pub show_hex: bool,
    /// Filter for selective display
    pub filter: PacketFilter,
}

impl PrinterConfig {
    /// Create config with hex output setting
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }

    /// Create config with filter
    pub fn with_filter(mut self, filter: PacketFilter) -> Self {
        self.filter = filter;
        self
    }

    fn should_show_query(&self, query: u32) -> bool {
        match &self.filter {
            PacketFilter::All | PacketFilter::Queries => true,
            PacketFilter::Events => false,
            PacketFilter::Query(q) => *q == query,
        }
    }

    fn should_show_events(&self) -> bool {
        matches!(&self.filter, PacketFilter::All | PacketFilter::Events)
    }
}

/// Transport middleware that prints all queries and notifications
pub struct PrinterTransport {
    inner: Arc<dyn Transport>,
    config: PrinterConfig,
}

impl PrinterTransport {
    /// Wrap a transport with printing middleware
    pub fn wrap(transport: Arc<dyn Transport>, config: PrinterConfig) -> Arc<dyn Transport> {
        Arc::new(Self {
            inner: transport,
            config,
        })
    }

    /// Print a request; returns the query id when it was shown
    fn print_request(&self, method_id: u32, input: &[u8]) -> Option<u32> {
        let args = match BiosArgs::parse(input) {
            Ok(args) => args,
            Err(e) => {
                eprintln!("{} {}  {}", ">>>".cyan(), "REQ".cyan().bold(), e.to_string().red());
                return None;
            }
        };
        if !self.config.should_show_query(args.commandtype()) {
            return None;
        }

        let name = match BiosCommand::from_u32(args.command()) {
            Some(command) => format!(
                "{} {}",
                command.name(),
                query_name(command, args.commandtype())
            ),
            None => format!("0x{:x} ?", args.command()),
        };
        eprintln!(
            "{} {}  0x{:02x} {} size={} method={}",
            ">>>".cyan(),
            "REQ".cyan().bold(),
            args.commandtype(),
            name.yellow(),
            args.datasize(),
            method_id
        );
        if self.config.show_hex {
            eprintln!("    {}  {:02x?}", "HEX".dim(), args.input());
        }
        Some(args.commandtype())
    }

    fn print_response(&self, result: &Result<Option<AcpiObject>, TransportError>) {
        let bytes = match result {
            Ok(Some(AcpiObject::Buffer(bytes))) => bytes,
            Ok(Some(other)) => {
                eprintln!(
                    "{} {}  {}",
                    "<<<".green(),
                    "RSP".green().bold(),
                    format!("unexpected {}", other.type_name()).red()
                );
                return;
            }
            Ok(None) => {
                eprintln!("{} {}  {}", "<<<".green(), "RSP".green().bold(), "none".red());
                return;
            }
            Err(e) => {
                eprintln!("{} {}  {}", "<<<".green(), "ERR".red().bold(), e);
                return;
            }
        };

        match decode_response(bytes) {
            Ok((envelope, payload)) if envelope.return_code() == 0 => {
                eprintln!(
                    "{} {}  ok len={}",
                    "<<<".green(),
                    "RSP".green().bold(),
                    payload.len()
                );
                if self.config.show_hex && !payload.is_empty() {
                    eprintln!("    {}  {:02x?}", "HEX".dim(), payload);
                }
            }
            Ok((envelope, _)) => {
                let code = ReturnCode::from_raw(envelope.return_code());
                eprintln!(
                    "{} {}  {}",
                    "<<<".green(),
                    "RSP".green().bold(),
                    code.to_string().red()
                );
            }
            Err(e) => {
                eprintln!("{} {}  {}", "<<<".green(), "RSP".green().bold(), e.to_string().red());
            }
        }
    }

    fn print_notification(config: &PrinterConfig, notification: &RawNotification) {
        if !config.should_show_events() {
            return;
        }
        match parse_notification(notification.payload.as_ref()) {
            Ok(event) => {
                let name = event.id().map_or("UNKNOWN", |id| id.name());
                eprintln!(
                    "{} {}  0x{:02x} {} data=0x{:x}",
                    "<<<".yellow(),
                    "EVT".yellow().bold(),
                    event.event_id,
                    name.yellow(),
                    event.event_data
                );
            }
            Err(e) => {
                eprintln!("{} {}  {}", "<<<".yellow(), "EVT".yellow().bold(), e.to_string().red());
            }
        }
        if config.show_hex {
            if let Some(AcpiObject::Buffer(bytes)) = &notification.payload {
                eprintln!("    {}  {:02x?}", "HEX".dim(), bytes);
            }
        }
    }
}

impl Transport for PrinterTransport {
    fn evaluate_method(
        &self,
        interface: InterfaceId,
        instance: u8,
        method_id: u32,
        input: &[u8],
    ) -> Result<Option<AcpiObject>, TransportError> {
        let shown = self.print_request(method_id, input);
        let result = self.inner.evaluate_method(interface, instance, method_id, input);
        if shown.is_some() {
            self.print_response(&result);
        }
        result
    }

    fn has_interface(&self, interface: InterfaceId) -> bool {
        self.inner.has_interface(interface)
    }

    fn subscribe_notifications(&self) -> Option<broadcast::Receiver<RawNotification>> {
        let mut upstream = self.inner.subscribe_notifications()?;
        let (tx, rx) = broadcast::channel(NOTIFICATION_CHANNEL_CAPACITY);
        let config = self.config.clone();

        thread::spawn(move || loop {
            match upstream.blocking_recv() {
                Ok(notification) => {
                    Self::print_notification(&config, &notification);
                    if tx.send(notification).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!("printer lagged {} notifications", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        });

        Some(rx)
    }
}
