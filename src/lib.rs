// HP WMI platform diagnostics - shared library
// Machine description loading and platform session setup for the CLI

pub mod config;
pub mod session;

pub use config::AppConfig;
pub use session::{parse_hex_bytes, InfoReport, RadioRow, Session};
