//! Machine description file
//!
//! One TOML file describes both the platform settings and the firmware the
//! CLI drives:
//!
//! ```toml
//! [platform]
//! fourzone = true
//! keymap = [{ scancode = 0x21A5, key = "f23" }]
//!
//! [firmware]
//! wireless = 0xA03
//! hardware = 0x01
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use hpwmi_platform::PlatformConfig;
use hpwmi_transport::EmulatedFirmwareConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub platform: PlatformConfig,
    pub firmware: EmulatedFirmwareConfig,
}

impl AppConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hp_wmi")
            .join("machine.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpwmi_platform::{Key, KeymapEntry};

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(AppConfig::from_toml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_both_tables() {
        let config = AppConfig::from_toml(
            r#"
            [platform]
            fourzone = false
            keymap = [{ scancode = 0x21A5, key = "f23" }]

            [firmware]
            wireless = 0xA03
            feature2 = false
            "#,
        )
        .unwrap();
        assert!(!config.platform.fourzone);
        assert_eq!(
            config.platform.keymap,
            vec![KeymapEntry::new(0x21A5, Key::F23)]
        );
        assert_eq!(config.firmware.wireless, Some(0xA03));
        assert!(!config.firmware.feature2);
        assert!(config.firmware.bios_interface);
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = Path::new("/nonexistent/hp_wmi/machine.toml");
        assert_eq!(AppConfig::load(path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_unknown_key_name_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [platform]
            keymap = [{ scancode = 1, key = "key_q" }]
            "#,
        );
        assert!(result.is_err());
    }
}
