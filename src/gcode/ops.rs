//! # GCode Operations
//!
//! This module defines the typed operations a session can emit. A
//! [`Program`] is an ordered list of them that can be validated against
//! machine bounds, optimized, and compiled to text lines.
//!
//! Each op maps to at most one GCode line, so a program can be streamed
//! one op at a time with an acknowledgement per line.

use std::time::Duration;

/// Positioning mode (G90/G91).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    #[default]
    Absolute,
    Relative,
}

/// Length units (G21/G20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnits {
    #[default]
    Millimeters,
    Inches,
}

impl LengthUnits {
    /// Convert a value in these units to millimeters.
    #[inline]
    pub fn to_mm(self, value: f64) -> f64 {
        match self {
            Self::Millimeters => value,
            Self::Inches => value * 25.4,
        }
    }
}

/// Units for dwell durations. Selects `G4 S` or `G4 P`; emits no line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnits {
    #[default]
    Seconds,
    Milliseconds,
}

/// Active coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// G53
    Machine,
    /// G54 (1) through G59.3 (9)
    Workpiece(u8),
}

impl Default for CoordinateSystem {
    fn default() -> Self {
        Self::Workpiece(1)
    }
}

/// Optional X/Y/Z targets plus an optional feed rate.
///
/// ```
/// use ender::gcode::Axes;
///
/// let target = Axes::new().x(10.0).y(20.0).f(1500.0);
/// assert_eq!(target.xyz(), [Some(10.0), Some(20.0), None]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Axes {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    /// Feed rate in units per minute
    pub f: Option<f64>,
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(mut self, value: f64) -> Self {
        self.x = Some(value);
        self
    }

    pub fn y(mut self, value: f64) -> Self {
        self.y = Some(value);
        self
    }

    pub fn z(mut self, value: f64) -> Self {
        self.z = Some(value);
        self
    }

    pub fn f(mut self, value: f64) -> Self {
        self.f = Some(value);
        self
    }

    pub fn xyz(&self) -> [Option<f64>; 3] {
        [self.x, self.y, self.z]
    }

    /// True if no word would be emitted.
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.z.is_none() && self.f.is_none()
    }
}

/// GCode operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // ========== Motion ==========
    /// Rapid travel (G0).
    Rapid(Axes),

    /// Linear move (G1).
    Linear(Axes),

    /// Pause (G4).
    Dwell(Duration),

    /// Home the named axes, all when none are named (G28).
    Home { x: bool, y: bool, z: bool },

    /// Redefine the current position (G92).
    SetAxis {
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
    },

    // ========== Modes ==========
    DistanceMode(DistanceMode),
    LengthUnits(LengthUnits),
    MachineCoordinates,
    /// Workpiece coordinate system 1-9 (G54-G59.3).
    WorkpieceCoordinates(u8),

    // ========== Temperature ==========
    /// Bed target in °C (M140).
    BedTemperature(f64),
    /// Hotend target in °C (M104).
    HotendTemperature(f64),

    // ========== Queries / passthrough ==========
    /// M114
    ReportPosition,
    /// A verbatim line, sent without bounds checks.
    Raw(String),
    Comment(String),
}

/// An ordered list of ops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub ops: Vec<Op>,
}

impl Program {
    /// Create an empty program.
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Add an op to the program.
    pub fn push(&mut self, op: Op) {
        self.ops.push(op);
    }

    /// Add multiple ops to the program.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = Op>) {
        self.ops.extend(ops);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        self.ops.iter()
    }
}

impl FromIterator<Op> for Program {
    fn from_iter<T: IntoIterator<Item = Op>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Program {
    type Item = Op;
    type IntoIter = std::vec::IntoIter<Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Op;
    type IntoIter = std::slice::Iter<'a, Op>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
