//! # Machine Profiles
//!
//! This module defines hardware specifications for supported printers.
//!
//! ## Supported Printers
//!
//! | Model | Build volume (mm) | Bed (°C) | Feed rate (mm/min) | Baud |
//! |-------|-------------------|----------|--------------------|------|
//! | Ender-3 | 235 x 235 x 90 | 0-100 | 50-7000 | 115200 |
//!
//! ## Usage
//!
//! ```
//! use ender::printer::MachineProfile;
//!
//! let profile = MachineProfile::ENDER3;
//! assert_eq!(profile.baud_rate, 115200);
//! assert!(profile.bounds.feed_rate.contains(3000.0));
//! ```

use super::bounds::{AxisRange, Bounds, Range};
use crate::settings::MachineSettings;

/// # Machine Profile
///
/// Physical limits and startup tuning for one printer model.
///
/// ## Startup Lines
///
/// Stock Marlin on the Ender-3 ships with conservative motion limits:
///
/// ```text
/// M203 X500.00 Y500.00 Z5.00 E25.00     ; max feed rates (units/s)
/// M204 P500.00 R500.00 T500.00          ; print/retract/travel acceleration
/// ```
///
/// The session raises these on connect with `max_feedrate` and
/// `acceleration`, which are sent verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineProfile {
    /// Printer model name
    pub name: &'static str,

    /// Limits enforced on generated commands
    pub bounds: Bounds,

    /// Serial baud rate the firmware listens on
    pub baud_rate: u32,

    /// Max feed rate line sent during initialization (M203)
    pub max_feedrate: &'static str,

    /// Acceleration line sent during initialization (M204)
    pub acceleration: &'static str,
}

impl MachineProfile {
    /// # Creality Ender-3
    ///
    /// | Property | Value |
    /// |----------|-------|
    /// | Firmware | Marlin |
    /// | Build volume | 235 x 235 x 90 mm (Z limited for tooling clearance) |
    /// | Interface | USB-serial (CH340), 115200 baud |
    pub const ENDER3: Self = Self {
        name: "Creality Ender-3",
        bounds: Bounds {
            bed_temperature: Range::new(0.0, 100.0),
            hotend_temperature: Range::new(0.0, 260.0),
            feed_rate: Range::new(50.0, 7000.0),
            axes: AxisRange::new([0.0, 0.0, 0.0], [235.0, 235.0, 90.0]),
        },
        baud_rate: 115200,
        max_feedrate: "M203 X5000 Y5000 Z10.0",
        acceleration: "M204 P1000 T1000",
    };

    /// Apply bound overrides from a settings file.
    pub fn with_overrides(mut self, overrides: &MachineSettings) -> Self {
        if let Some(range) = overrides.bed_temperature {
            self.bounds.bed_temperature = range;
        }
        if let Some(range) = overrides.hotend_temperature {
            self.bounds.hotend_temperature = range;
        }
        if let Some(range) = overrides.feed_rate {
            self.bounds.feed_rate = range;
        }
        if let Some(axes) = overrides.axes {
            self.bounds.axes = axes;
        }
        self
    }

    /// Lines sent right after connecting, in order.
    pub fn startup_lines(&self) -> [&'static str; 2] {
        [self.max_feedrate, self.acceleration]
    }
}

impl Default for MachineProfile {
    fn default() -> Self {
        Self::ENDER3
    }
}
