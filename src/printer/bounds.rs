//! # Machine Bounds
//!
//! Inclusive ranges that every generated command is checked against before
//! it reaches the printer.

use serde::{Deserialize, Serialize};

use crate::error::{EnderError, Result};

/// Axis labels, in word order.
pub const AXIS_NAMES: [&str; 3] = ["X", "Y", "Z"];

/// An inclusive `[min, max]` range for a scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True if `value` lies within the range. NaN never does.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check `value`, naming `parameter` in the error.
    pub fn check(&self, parameter: &str, value: f64) -> Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(EnderError::out_of_bounds(
                parameter, value, self.min, self.max,
            ))
        }
    }
}

/// Per-axis travel limits in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl AxisRange {
    pub const fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Range for a single axis (0 = X, 1 = Y, 2 = Z).
    pub fn axis(&self, index: usize) -> Range {
        Range::new(self.min[index], self.max[index])
    }

    /// Check a target position. `None` entries are not moving and skipped.
    pub fn check(&self, target: [Option<f64>; 3]) -> Result<()> {
        for (index, value) in target.iter().enumerate() {
            if let Some(value) = value {
                self.axis(index)
                    .check(&format!("axes.{}", AXIS_NAMES[index]), *value)?;
            }
        }
        Ok(())
    }
}

/// The full set of bounds for one machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub bed_temperature: Range,
    pub hotend_temperature: Range,
    /// Feed rate in mm/min
    pub feed_rate: Range,
    pub axes: AxisRange,
}

impl Bounds {
    /// Check that every range is well formed.
    pub fn validate(&self) -> Result<()> {
        let scalars = [
            ("bed_temperature", self.bed_temperature),
            ("hotend_temperature", self.hotend_temperature),
            ("feed_rate", self.feed_rate),
        ];
        for (name, range) in scalars {
            if !(range.min <= range.max) {
                return Err(EnderError::Config(format!(
                    "{} min {} exceeds max {}",
                    name, range.min, range.max
                )));
            }
        }
        for index in 0..3 {
            let range = self.axes.axis(index);
            if !(range.min <= range.max) {
                return Err(EnderError::Config(format!(
                    "axes.{} min {} exceeds max {}",
                    AXIS_NAMES[index], range.min, range.max
                )));
            }
        }
        Ok(())
    }
}
