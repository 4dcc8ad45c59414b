//! # Marlin GCode Protocol
//!
//! This module provides low-level GCode line builders and reply parsing for
//! Marlin firmware as shipped on Creality Ender-3 printers.
//!
//! ## Module Structure
//!
//! - [`commands`]: GCode line builders (motion, modes, coordinate systems)
//! - [`response`]: Reply classification and M114/M115 parsing
//!
//! ## Usage Example
//!
//! ```
//! use ender::protocol::{commands, response::Reply};
//!
//! let mut lines = Vec::new();
//! lines.push(commands::units_mm());
//! lines.push(commands::absolute());
//! lines.push(commands::linear(Some(10.0), Some(10.0), None, Some(1500.0)));
//!
//! assert_eq!(lines.join("\n"), "G21\nG90\nG1 X10 Y10 F1500");
//! assert_eq!(Reply::parse("ok"), Reply::Ok);
//! ```

pub mod commands;
pub mod response;

pub use response::{Position, Reply};
