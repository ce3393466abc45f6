//! Hotkey scancode to key mapping

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keys the hotkey interface can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    BrightnessUp,
    BrightnessDown,
    Prog1,
    Prog2,
    Media,
    Info,
    RotateDisplay,
    Setup,
    Help,
    F23,
    F24,
}

impl Key {
    /// Linux input event code
    pub fn code(&self) -> u16 {
        match self {
            Self::BrightnessUp => 225,
            Self::BrightnessDown => 224,
            Self::Prog1 => 148,
            Self::Prog2 => 149,
            Self::Media => 226,
            Self::Info => 358,
            Self::RotateDisplay => 153,
            Self::Setup => 141,
            Self::Help => 138,
            Self::F23 => 193,
            Self::F24 => 194,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BrightnessUp => "KEY_BRIGHTNESSUP",
            Self::BrightnessDown => "KEY_BRIGHTNESSDOWN",
            Self::Prog1 => "KEY_PROG1",
            Self::Prog2 => "KEY_PROG2",
            Self::Media => "KEY_MEDIA",
            Self::Info => "KEY_INFO",
            Self::RotateDisplay => "KEY_ROTATE_DISPLAY",
            Self::Setup => "KEY_SETUP",
            Self::Help => "KEY_HELP",
            Self::F23 => "KEY_F23",
            Self::F24 => "KEY_F24",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One scancode binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeymapEntry {
    pub scancode: u32,
    pub key: Key,
}

impl KeymapEntry {
    pub const fn new(scancode: u32, key: Key) -> Self {
        Self { scancode, key }
    }
}

/// Bindings every machine gets
pub const BUILTIN_KEYMAP: [KeymapEntry; 9] = [
    KeymapEntry::new(0x02, Key::BrightnessUp),
    KeymapEntry::new(0x03, Key::BrightnessDown),
    KeymapEntry::new(0x20E6, Key::Prog1),
    KeymapEntry::new(0x20E8, Key::Media),
    KeymapEntry::new(0x2142, Key::Media),
    KeymapEntry::new(0x213B, Key::Info),
    KeymapEntry::new(0x2169, Key::RotateDisplay),
    KeymapEntry::new(0x216A, Key::Setup),
    KeymapEntry::new(0x231B, Key::Help),
];

/// Sparse keymap: built-in bindings plus configured extras
///
/// Configured entries are searched first, so they can rebind a built-in
/// scancode.
#[derive(Debug, Clone)]
pub struct Keymap {
    entries: Vec<KeymapEntry>,
}

impl Keymap {
    pub fn new(extra: &[KeymapEntry]) -> Self {
        let entries = extra.iter().chain(BUILTIN_KEYMAP.iter()).copied().collect();
        Self { entries }
    }

    pub fn lookup(&self, scancode: u32) -> Option<Key> {
        self.entries
            .iter()
            .find(|entry| entry.scancode == scancode)
            .map(|entry| entry.key)
    }

    pub fn entries(&self) -> &[KeymapEntry] {
        &self.entries
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new(&[])
    }
}
