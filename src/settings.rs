//! # Settings File
//!
//! Runtime settings loaded from TOML. Every field is optional; a missing
//! file section falls back to the Ender-3 defaults with port auto-discovery.
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 115200
//! ack_timeout_ms = 20000
//!
//! [machine]
//! feed_rate = { min = 50.0, max = 5000.0 }
//! axes = { min = [0.0, 0.0, 0.0], max = [220.0, 220.0, 90.0] }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{EnderError, Result};
use crate::printer::{AxisRange, MachineProfile, Range};

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub serial: SerialSettings,
    pub machine: MachineSettings,
}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialSettings {
    /// Device path; `None` means probe for the printer
    pub port: Option<String>,
    pub baud_rate: u32,
    /// Read timeout applied to the port itself
    pub timeout_ms: u64,
    /// How long to wait for the M115 reply while probing
    pub probe_delay_ms: u64,
    /// Longest silence tolerated while waiting for `ok`
    pub ack_timeout_ms: u64,
    /// How long to wait for the firmware's boot banner after opening
    pub startup_timeout_ms: u64,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: MachineProfile::ENDER3.baud_rate,
            timeout_ms: 500,
            probe_delay_ms: 500,
            ack_timeout_ms: 10_000,
            startup_timeout_ms: 3_000,
        }
    }
}

impl SerialSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn probe_delay(&self) -> Duration {
        Duration::from_millis(self.probe_delay_ms)
    }

    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }
}

/// Optional overrides for the machine profile bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineSettings {
    pub bed_temperature: Option<Range>,
    pub hotend_temperature: Option<Range>,
    pub feed_rate: Option<Range>,
    pub axes: Option<AxisRange>,
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EnderError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let settings = Self::from_toml_str(&content)?;
        log::debug!(target: "ender", "Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(content).map_err(|e| EnderError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Render the settings as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EnderError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let serial = &self.serial;
        if serial.baud_rate == 0 {
            return Err(EnderError::Config("baud_rate must be positive".into()));
        }
        for (name, value) in [
            ("timeout_ms", serial.timeout_ms),
            ("probe_delay_ms", serial.probe_delay_ms),
            ("ack_timeout_ms", serial.ack_timeout_ms),
            ("startup_timeout_ms", serial.startup_timeout_ms),
        ] {
            if value == 0 {
                return Err(EnderError::Config(format!("{} must be positive", name)));
            }
        }
        if matches!(&serial.port, Some(port) if port.trim().is_empty()) {
            return Err(EnderError::Config("port must not be empty".into()));
        }
        self.profile().bounds.validate()
    }

    /// The Ender-3 profile with this file's overrides applied.
    pub fn profile(&self) -> MachineProfile {
        MachineProfile::ENDER3.with_overrides(&self.machine)
    }
}
