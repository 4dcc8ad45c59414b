//! # Printer Module
//!
//! This module provides machine profiles and the bounds they enforce.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications
//! - [`bounds`]: Inclusive ranges for temperatures, feed rates, and travel

pub mod bounds;
pub mod config;

pub use bounds::{AxisRange, Bounds, Range};
pub use config::MachineProfile;
