//! # GCode Programs
//!
//! This module provides the typed layer between session calls and raw
//! GCode text.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐     ┌──────────┐
//! │ Session API │ ──► │  Vec<Op>    │ ──► │ MachineState │ ──► │ Codegen  │
//! │ / import    │     │  (Program)  │     │   (bounds)   │     │ (lines)  │
//! └─────────────┘     └─────────────┘     └──────────────┘     └──────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use ender::gcode::{Axes, DistanceMode, LengthUnits, Op, Program};
//! use ender::printer::MachineProfile;
//!
//! let mut program = Program::new();
//! program.push(Op::LengthUnits(LengthUnits::Millimeters));
//! program.push(Op::DistanceMode(DistanceMode::Absolute));
//! program.push(Op::Rapid(Axes::new().x(10.0).y(10.0)));
//! program.push(Op::Linear(Axes::new().x(50.0).f(1500.0)));
//!
//! program.validate(&MachineProfile::ENDER3.bounds)?;
//! assert_eq!(program.optimize().to_text(), "G21\nG90\nG0 X10 Y10\nG1 X50 F1500\n");
//! # Ok::<(), ender::EnderError>(())
//! ```

mod codegen;
mod ops;
mod optimize;
mod state;

pub use ops::*;
pub use state::MachineState;
