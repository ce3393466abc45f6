//! Radio kill-switch collaborators

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

use crate::error::PlatformError;
use crate::radio::{BlockState, RadioKind};

/// Control handle of one registered radio
///
/// Dropping the handle unregisters the radio.
pub trait RfkillSwitch: Send + Sync {
    /// Push freshly read block state
    fn set_states(&self, soft: bool, hard: bool);
}

/// Registers radios with the host's kill-switch core
pub trait RfkillRegistrar: Send + Sync {
    fn register(
        &self,
        name: &str,
        kind: RadioKind,
        initial: BlockState,
    ) -> Result<Box<dyn RfkillSwitch>, PlatformError>;
}

/// Registered radio as tracked by [`SoftRfkill`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoftSwitchState {
    pub id: usize,
    pub name: String,
    pub kind: RadioKind,
    pub soft_blocked: bool,
    pub hard_blocked: bool,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: usize,
    switches: Vec<SoftSwitchState>,
}

/// In-memory kill-switch core
#[derive(Debug, Clone, Default)]
pub struct SoftRfkill {
    registry: Arc<Mutex<Registry>>,
}

impl SoftRfkill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently registered radios, in registration order
    pub fn switches(&self) -> Vec<SoftSwitchState> {
        self.registry.lock().switches.clone()
    }

    pub fn get(&self, name: &str) -> Option<SoftSwitchState> {
        self.registry
            .lock()
            .switches
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }
}

impl RfkillRegistrar for SoftRfkill {
    fn register(
        &self,
        name: &str,
        kind: RadioKind,
        initial: BlockState,
    ) -> Result<Box<dyn RfkillSwitch>, PlatformError> {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.switches.push(SoftSwitchState {
            id,
            name: name.to_string(),
            kind,
            soft_blocked: initial.soft,
            hard_blocked: initial.hard,
        });
        debug!("registered {} (soft={}, hard={})", name, initial.soft, initial.hard);

        Ok(Box::new(SoftSwitch {
            id,
            registry: Arc::clone(&self.registry),
        }))
    }
}

struct SoftSwitch {
    id: usize,
    registry: Arc<Mutex<Registry>>,
}

impl RfkillSwitch for SoftSwitch {
    fn set_states(&self, soft: bool, hard: bool) {
        let mut registry = self.registry.lock();
        if let Some(state) = registry.switches.iter_mut().find(|s| s.id == self.id) {
            state.soft_blocked = soft;
            state.hard_blocked = hard;
        }
    }
}

impl Drop for SoftSwitch {
    fn drop(&mut self) {
        self.registry.lock().switches.retain(|s| s.id != self.id);
    }
}
