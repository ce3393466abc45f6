//! Platform session: emulated firmware, collaborators and the platform itself

use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::info;

use hpwmi_platform::{
    Capabilities, InputRecorder, Platform, RadioInfo, RadioMode, SoftRfkill, SwitchSupport,
};
use hpwmi_transport::{BoxedTransport, EmulatedFirmware, PrinterConfig, PrinterTransport};

use crate::config::AppConfig;

/// Everything one CLI invocation works with
pub struct Session {
    pub firmware: Arc<EmulatedFirmware>,
    pub rfkill: SoftRfkill,
    pub input: Arc<InputRecorder>,
    pub platform: Arc<Platform>,
}

impl Session {
    /// Build the firmware from `config` and run platform setup against it.
    /// With `printer` set, every query and notification is printed.
    pub fn open(config: AppConfig, printer: Option<PrinterConfig>) -> anyhow::Result<Self> {
        let firmware = Arc::new(EmulatedFirmware::new(config.firmware));
        let transport: BoxedTransport = match printer {
            Some(printer) => {
                info!("Monitor mode enabled - printing all queries/responses");
                PrinterTransport::wrap(firmware.clone(), printer)
            }
            None => firmware.clone(),
        };

        let rfkill = SoftRfkill::new();
        let input = Arc::new(InputRecorder::new());
        let platform = Platform::builder(transport)
            .config(config.platform)
            .input(input.clone())
            .rfkill(Arc::new(rfkill.clone()))
            .setup()
            .context("platform setup failed")?;

        Ok(Self {
            firmware,
            rfkill,
            input,
            platform: Arc::new(platform),
        })
    }

    /// Registered radios joined with their current kill-switch state
    pub fn radio_rows(&self) -> Vec<RadioRow> {
        let switches = self.rfkill.switches();
        self.platform
            .radios()
            .into_iter()
            .zip(switches)
            .map(|(info, switch)| RadioRow {
                info,
                soft_blocked: switch.soft_blocked,
                hard_blocked: switch.hard_blocked,
            })
            .collect()
    }

    pub fn report(&self) -> InfoReport {
        InfoReport {
            capabilities: self.platform.capabilities(),
            switches: self.platform.switches(),
            radio_mode: self.platform.radio_mode(),
            radios: self.radio_rows(),
            fourzone: self.platform.fourzone_enabled(),
            attributes: self
                .platform
                .attributes()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// One radio as shown by `info` and `rfkill list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadioRow {
    #[serde(flatten)]
    pub info: RadioInfo,
    pub soft_blocked: bool,
    pub hard_blocked: bool,
}

/// Output of the `info` command
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub capabilities: Capabilities,
    pub switches: SwitchSupport,
    pub radio_mode: Option<RadioMode>,
    pub radios: Vec<RadioRow>,
    pub fourzone: bool,
    pub attributes: Vec<String>,
}

/// Parse hex bytes given as one string ("0400000000000000"), separate
/// words ("04 00 00 00") or a mix of both; `0x` prefixes are ignored
pub fn parse_hex_bytes<S: AsRef<str>>(words: &[S]) -> anyhow::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for word in words {
        let word = word.as_ref().trim();
        let hex = word
            .strip_prefix("0x")
            .or_else(|| word.strip_prefix("0X"))
            .unwrap_or(word);
        if hex.is_empty() {
            continue;
        }
        if hex.len() % 2 != 0 {
            bail!("odd number of hex digits in {:?}", word);
        }
        for i in (0..hex.len()).step_by(2) {
            let pair = hex
                .get(i..i + 2)
                .with_context(|| format!("invalid hex {:?}", word))?;
            let byte = u8::from_str_radix(pair, 16)
                .with_context(|| format!("invalid hex {:?}", word))?;
            bytes.push(byte);
        }
    }
    Ok(bytes)
}
