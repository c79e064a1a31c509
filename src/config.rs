//! Controller configuration
//!
//! TOML file at `~/.config/mouse-controller/config.toml`; a missing file
//! means defaults. CLI flags override file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Report rate bounds (Hz)
pub const RATE_MIN: u32 = 10;
pub const RATE_MAX: u32 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Adapter alias and SDP service name shown to hosts
    pub device_name: String,
    /// Bluetooth adapter to use (e.g. "hci0")
    pub adapter: String,
    /// Input report rate in Hz
    pub report_rate_hz: u32,
    /// Grab source devices exclusively (captured motion stops driving
    /// the local cursor)
    pub grab_input: bool,
    /// Explicit evdev source paths; empty autodetects pointer devices
    pub input_devices: Vec<PathBuf>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_name: "HID Mouse".to_string(),
            adapter: "hci0".to_string(),
            report_rate_hz: 100,
            grab_input: false,
            input_devices: Vec::new(),
        }
    }
}

impl ControllerConfig {
    /// Default config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mouse-controller")
            .join("config.toml")
    }

    /// Load from a path; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write this config to a path, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Report rate clamped to the supported range
    pub fn effective_rate(&self) -> u32 {
        self.report_rate_hz.clamp(RATE_MIN, RATE_MAX)
    }

    /// Tick period derived from the effective rate
    pub fn report_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.effective_rate() as f64)
    }

    /// D-Bus object path for the adapter (e.g. `/org/bluez/hci0`)
    pub fn adapter_path(&self) -> String {
        format!("/org/bluez/{}", self.adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = ControllerConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("device_name = \"HID Mouse\""));
        assert!(text.contains("adapter = \"hci0\""));
        assert!(text.contains("report_rate_hz = 100"));
    }

    #[test]
    fn roundtrip() {
        let config = ControllerConfig {
            device_name: "Desk Mouse".into(),
            adapter: "hci1".into(),
            report_rate_hz: 125,
            grab_input: true,
            input_devices: vec![PathBuf::from("/dev/input/event4")],
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: ControllerConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.device_name, config.device_name);
        assert_eq!(parsed.adapter, config.adapter);
        assert_eq!(parsed.report_rate_hz, config.report_rate_hz);
        assert_eq!(parsed.grab_input, config.grab_input);
        assert_eq!(parsed.input_devices, config.input_devices);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: ControllerConfig = toml::from_str("device_name = \"Travel Mouse\"").unwrap();
        assert_eq!(parsed.device_name, "Travel Mouse");
        assert_eq!(parsed.adapter, "hci0");
        assert_eq!(parsed.report_rate_hz, 100);
    }

    #[test]
    fn rate_is_clamped() {
        let mut config = ControllerConfig::default();
        config.report_rate_hz = 5;
        assert_eq!(config.effective_rate(), RATE_MIN);
        config.report_rate_hz = 8000;
        assert_eq!(config.effective_rate(), RATE_MAX);
        config.report_rate_hz = 100;
        assert_eq!(config.report_period(), std::time::Duration::from_millis(10));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = ControllerConfig::load(Path::new("/nonexistent/mouse.toml")).unwrap();
        assert_eq!(config.device_name, "HID Mouse");
    }

    #[test]
    fn adapter_path_format() {
        let config = ControllerConfig::default();
        assert_eq!(config.adapter_path(), "/org/bluez/hci0");
    }
}
