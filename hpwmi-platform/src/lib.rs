//! Platform state for HP laptops driven over WMI
//!
//! This crate provides the stateful layer on top of any transport:
//! capability probing, radio kill switches, dock/tablet switches, hotkeys,
//! four-zone keyboard lighting and the attribute surface. All of it hangs off
//! one [`Platform`] context whose mutable state sits behind a single lock, so
//! caller requests and notification handling never interleave.

pub mod attributes;
pub mod capability;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod keymap;
pub mod radio;
pub mod rfkill;
pub mod zone;

pub use attributes::Attribute;
pub use capability::Capabilities;
pub use config::PlatformConfig;
pub use error::PlatformError;
pub use events::EventAction;
pub use input::{InputEvent, InputRecorder, InputSink, Switch};
pub use keymap::{Key, Keymap, KeymapEntry};
pub use radio::{BlockState, RadioInfo, RadioKind, RadioMode, RadioStateModel};
pub use rfkill::{RfkillRegistrar, RfkillSwitch, SoftRfkill, SoftSwitchState};
pub use zone::ZoneColor;

use std::sync::{Arc, Weak};
use std::thread;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use hpwmi_transport::protocol::hardware;
use hpwmi_transport::{BiosQuery, BoxedTransport, Transport};

/// Switches and the hardware mask bit that reports each
const SWITCHES: [(Switch, u32); 2] = [
    (Switch::Dock, hardware::DOCK),
    (Switch::TabletMode, hardware::TABLET),
];

/// Which switches answered at setup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SwitchSupport {
    pub dock: bool,
    pub tablet: bool,
}

impl SwitchSupport {
    pub fn supports(&self, switch: Switch) -> bool {
        match switch {
            Switch::Dock => self.dock,
            Switch::TabletMode => self.tablet,
        }
    }

    fn set(&mut self, switch: Switch) {
        match switch {
            Switch::Dock => self.dock = true,
            Switch::TabletMode => self.tablet = true,
        }
    }
}

/// State shared between caller requests and notification handling
pub(crate) struct PlatformState {
    pub(crate) radios: Option<RadioStateModel>,
}

/// Builder for [`Platform`]
pub struct PlatformBuilder {
    transport: BoxedTransport,
    config: PlatformConfig,
    input: Option<Arc<dyn InputSink>>,
    rfkill: Option<Arc<dyn RfkillRegistrar>>,
}

impl PlatformBuilder {
    pub fn config(mut self, config: PlatformConfig) -> Self {
        self.config = config;
        self
    }

    /// Input sink for switches and hotkeys (default: [`InputRecorder`])
    pub fn input(mut self, input: Arc<dyn InputSink>) -> Self {
        self.input = Some(input);
        self
    }

    /// Kill-switch core for radios (default: [`SoftRfkill`])
    pub fn rfkill(mut self, rfkill: Arc<dyn RfkillRegistrar>) -> Self {
        self.rfkill = Some(rfkill);
        self
    }

    /// Probe the firmware and register everything it supports
    pub fn setup(self) -> Result<Platform, PlatformError> {
        let transport = self.transport;
        let config = self.config;
        let input = self
            .input
            .unwrap_or_else(|| Arc::new(InputRecorder::new()));
        let rfkill = self.rfkill.unwrap_or_else(|| Arc::new(SoftRfkill::new()));

        let capabilities = Capabilities::probe(&*transport)?;

        let mut switches = SwitchSupport::default();
        if capabilities.events {
            for (switch, mask) in SWITCHES {
                match transport.hw_state(mask) {
                    Ok(on) => {
                        switches.set(switch);
                        input.report_switch(switch, on);
                    }
                    Err(e) => debug!("{} not available: {}", switch.name(), e),
                }
            }
            input.sync();

            if config.enable_hotkeys && capabilities.needs_hotkey_enable() {
                if let Err(e) = capability::enable_hotkeys(&*transport) {
                    warn!("failed to enable hotkeys: {}", e);
                }
            }
        }

        let radios = if capabilities.bios {
            match RadioStateModel::probe(&*transport, &*rfkill) {
                Ok(model) => {
                    info!("{} radio(s) in {:?} mode", model.len(), model.mode());
                    Some(model)
                }
                Err(e) => {
                    info!("no radio control available: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let fourzone = capabilities.bios && config.fourzone;
        let keymap = Keymap::new(&config.keymap);

        Ok(Platform {
            transport,
            config,
            capabilities,
            switches,
            fourzone,
            keymap,
            input,
            state: Mutex::new(PlatformState { radios }),
        })
    }
}

/// Platform context
pub struct Platform {
    pub(crate) transport: BoxedTransport,
    config: PlatformConfig,
    capabilities: Capabilities,
    switches: SwitchSupport,
    pub(crate) fourzone: bool,
    pub(crate) keymap: Keymap,
    pub(crate) input: Arc<dyn InputSink>,
    pub(crate) state: Mutex<PlatformState>,
}

impl Platform {
    pub fn builder(transport: BoxedTransport) -> PlatformBuilder {
        PlatformBuilder {
            transport,
            config: PlatformConfig::default(),
            input: None,
            rfkill: None,
        }
    }

    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn switches(&self) -> SwitchSupport {
        self.switches
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn fourzone_enabled(&self) -> bool {
        self.fourzone
    }

    /// Run `f` with the transport while holding the state lock
    pub(crate) fn with_transport<R>(&self, f: impl FnOnce(&dyn Transport) -> R) -> R {
        let _guard = self.state.lock();
        f(&*self.transport)
    }

    /// Report every supported switch, then sync
    pub(crate) fn report_switches(&self) {
        for (switch, mask) in SWITCHES {
            if !self.switches.supports(switch) {
                continue;
            }
            match self.transport.hw_state(mask) {
                Ok(on) => self.input.report_switch(switch, on),
                Err(e) => warn!("failed to read {}: {}", switch.name(), e),
            }
        }
        self.input.sync();
    }

    // === Radios ===

    pub fn radio_mode(&self) -> Option<RadioMode> {
        self.state.lock().radios.as_ref().map(RadioStateModel::mode)
    }

    pub fn radios(&self) -> Vec<RadioInfo> {
        self.state
            .lock()
            .radios
            .as_ref()
            .map(RadioStateModel::radios)
            .unwrap_or_default()
    }

    /// Change a radio's software block, then re-read all radio state
    pub fn set_radio_blocked(&self, index: usize, blocked: bool) -> Result<(), PlatformError> {
        let state = self.state.lock();
        let radios = state
            .radios
            .as_ref()
            .ok_or_else(|| PlatformError::NotSupported("radio control".into()))?;
        radios.set_blocked(&*self.transport, index, blocked)?;
        if let Err(e) = radios.refresh(&*self.transport) {
            warn!("radio refresh after block change failed: {}", e);
        }
        Ok(())
    }

    /// Re-read radio state; returns indices skipped as stale
    pub fn refresh_radios(&self) -> Result<Vec<usize>, PlatformError> {
        let state = self.state.lock();
        match &state.radios {
            Some(radios) => radios.refresh(&*self.transport),
            None => Ok(Vec::new()),
        }
    }

    // === Lighting ===

    fn require_fourzone(&self) -> Result<(), PlatformError> {
        if self.fourzone {
            Ok(())
        } else {
            Err(PlatformError::NotSupported("four-zone lighting".into()))
        }
    }

    pub fn zone(&self, zone: usize) -> Result<ZoneColor, PlatformError> {
        self.require_fourzone()?;
        self.with_transport(|t| zone::read_zone(t, zone))
    }

    pub fn set_zone(&self, zone: usize, color: ZoneColor) -> Result<(), PlatformError> {
        self.require_fourzone()?;
        self.with_transport(|t| zone::write_zone(t, zone, color))
    }

    // === Power management ===

    /// Re-report hardware state after a resume
    pub fn resume(&self) -> Result<(), PlatformError> {
        let state = self.state.lock();
        if self.capabilities.events {
            self.report_switches();
        }
        if let Some(radios) = &state.radios {
            radios.refresh(&*self.transport)?;
        }
        Ok(())
    }

    // === Notifications ===

    /// Handle notifications on a background thread
    ///
    /// The thread holds only a weak reference. It exits on the first
    /// notification delivered after the platform is dropped, or when the
    /// transport closes its notification channel. Returns `None` without an
    /// event interface.
    pub fn spawn_listener(self: &Arc<Self>) -> Option<thread::JoinHandle<()>> {
        if !self.capabilities.events {
            return None;
        }
        let mut rx = self.transport.subscribe_notifications()?;
        let platform: Weak<Self> = Arc::downgrade(self);

        Some(thread::spawn(move || loop {
            match rx.blocking_recv() {
                Ok(notification) => {
                    let Some(platform) = platform.upgrade() else {
                        break;
                    };
                    platform.handle_notification(&notification);
                }
                Err(RecvError::Lagged(n)) => warn!("dropped {} notifications", n),
                Err(RecvError::Closed) => break,
            }
        }))
    }
}
