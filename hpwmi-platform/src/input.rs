//! Input event sink (switches and hotkeys)

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::keymap::Key;

/// Hardware switches reported through the input sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Switch {
    Dock,
    TabletMode,
}

impl Switch {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dock => "SW_DOCK",
            Self::TabletMode => "SW_TABLET_MODE",
        }
    }
}

/// Receiver of input events
///
/// Events between two `sync` calls form one atomic update.
pub trait InputSink: Send + Sync {
    fn report_switch(&self, switch: Switch, on: bool);
    fn report_key(&self, key: Key, pressed: bool);
    fn sync(&self);
}

/// One event as seen by an [`InputRecorder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Switch { switch: Switch, on: bool },
    Key { key: Key, pressed: bool },
    Sync,
}

/// Input sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct InputRecorder {
    events: Mutex<Vec<InputEvent>>,
}

impl InputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all recorded events
    pub fn take(&self) -> Vec<InputEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl InputSink for InputRecorder {
    fn report_switch(&self, switch: Switch, on: bool) {
        debug!("{} = {}", switch.name(), on as u8);
        self.events.lock().push(InputEvent::Switch { switch, on });
    }

    fn report_key(&self, key: Key, pressed: bool) {
        debug!("{} {}", key, if pressed { "down" } else { "up" });
        self.events.lock().push(InputEvent::Key { key, pressed });
    }

    fn sync(&self) {
        self.events.lock().push(InputEvent::Sync);
    }
}
