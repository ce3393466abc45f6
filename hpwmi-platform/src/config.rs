//! Per-machine platform settings

use serde::{Deserialize, Serialize};

use crate::keymap::KeymapEntry;

/// Platform configuration, loaded from the `[platform]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Expose the four keyboard lighting zones
    pub fourzone: bool,
    /// Extra hotkey bindings
    pub keymap: Vec<KeymapEntry>,
    /// Switch on hotkey events on 2008-era firmware
    pub enable_hotkeys: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            fourzone: true,
            keymap: Vec::new(),
            enable_hotkeys: true,
        }
    }
}
