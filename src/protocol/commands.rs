//! # GCode Command Builders
//!
//! This module builds the individual GCode lines understood by Marlin
//! firmware on the Ender-3.
//!
//! ## Line Structure
//!
//! A line is a command word followed by parameter words:
//!
//! ```text
//! G1 X10 Y20.5 F1500
//! │  └─ parameter words (letter + number)
//! └─ command word (G = motion/mode, M = machine)
//! ```
//!
//! Builders return a single line without the terminator; transports append
//! `\n` when writing. Parameter words always appear in X Y Z F order and
//! omitted axes are left out entirely.
//!
//! ## Number Formatting
//!
//! Numbers use at most three decimals with trailing zeros trimmed, so
//! `10.0` becomes `10` and `0.1250` becomes `0.125`.

/// Format a number as a GCode parameter value.
///
/// ```
/// use ender::protocol::commands::format_number;
///
/// assert_eq!(format_number(10.0), "10");
/// assert_eq!(format_number(12.3456), "12.346");
/// assert_eq!(format_number(-0.0001), "0");
/// ```
pub fn format_number(value: f64) -> String {
    let mut text = format!("{:.3}", value);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

/// Append ` <letter><value>` for each present parameter.
fn push_words(line: &mut String, words: &[(char, Option<f64>)]) {
    for (letter, value) in words {
        if let Some(value) = value {
            line.push(' ');
            line.push(*letter);
            line.push_str(&format_number(*value));
        }
    }
}

fn motion(command: &str, x: Option<f64>, y: Option<f64>, z: Option<f64>, f: Option<f64>) -> String {
    let mut line = command.to_string();
    push_words(&mut line, &[('X', x), ('Y', y), ('Z', z), ('F', f)]);
    line
}

// ============================================================================
// MOTION
// ============================================================================

/// # Rapid Move (G0)
///
/// Travel move; Marlin treats G0 and G1 identically but slicers use G0 for
/// non-extruding travel.
///
/// ```
/// use ender::protocol::commands;
///
/// assert_eq!(commands::rapid(Some(10.0), None, Some(5.0), None), "G0 X10 Z5");
/// ```
pub fn rapid(x: Option<f64>, y: Option<f64>, z: Option<f64>, f: Option<f64>) -> String {
    motion("G0", x, y, z, f)
}

/// # Linear Move (G1)
pub fn linear(x: Option<f64>, y: Option<f64>, z: Option<f64>, f: Option<f64>) -> String {
    motion("G1", x, y, z, f)
}

/// # Dwell (G4)
///
/// `S` takes seconds, `P` takes milliseconds.
pub fn dwell_seconds(seconds: f64) -> String {
    format!("G4 S{}", format_number(seconds))
}

pub fn dwell_millis(millis: f64) -> String {
    format!("G4 P{}", format_number(millis))
}

/// # Auto Home (G28)
///
/// Homes the named axes, or all axes when none are named.
pub fn home(x: bool, y: bool, z: bool) -> String {
    let mut line = String::from("G28");
    for (letter, selected) in [('X', x), ('Y', y), ('Z', z)] {
        if selected {
            line.push(' ');
            line.push(letter);
        }
    }
    line
}

/// # Set Position (G92)
///
/// Redefines the current position without moving.
pub fn set_axis(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> String {
    let mut line = String::from("G92");
    push_words(&mut line, &[('X', x), ('Y', y), ('Z', z)]);
    line
}

// ============================================================================
// MODES
// ============================================================================

/// Absolute positioning (G90)
#[inline]
pub fn absolute() -> String {
    "G90".to_string()
}

/// Relative positioning (G91)
#[inline]
pub fn relative() -> String {
    "G91".to_string()
}

/// Millimeter units (G21)
#[inline]
pub fn units_mm() -> String {
    "G21".to_string()
}

/// Inch units (G20)
#[inline]
pub fn units_inch() -> String {
    "G20".to_string()
}

// ============================================================================
// COORDINATE SYSTEMS
// ============================================================================

/// Workpiece coordinate system words, indexed by system number - 1.
pub const WORKPIECE_SYSTEMS: [&str; 9] = [
    "G54", "G55", "G56", "G57", "G58", "G59", "G59.1", "G59.2", "G59.3",
];

/// Move in machine coordinates (G53)
#[inline]
pub fn machine_coordinates() -> String {
    "G53".to_string()
}

/// # Select Workpiece Coordinate System (G54-G59.3)
///
/// Returns `None` unless `number` is in 1..=9.
///
/// ```
/// use ender::protocol::commands;
///
/// assert_eq!(commands::workpiece_coordinates(1).as_deref(), Some("G54"));
/// assert_eq!(commands::workpiece_coordinates(9).as_deref(), Some("G59.3"));
/// assert_eq!(commands::workpiece_coordinates(10), None);
/// ```
pub fn workpiece_coordinates(number: u8) -> Option<String> {
    let index = usize::from(number).checked_sub(1)?;
    WORKPIECE_SYSTEMS.get(index).map(|word| word.to_string())
}

// ============================================================================
// TEMPERATURE
// ============================================================================

/// Set bed temperature without waiting (M140)
pub fn bed_temperature(celsius: f64) -> String {
    format!("M140 S{}", format_number(celsius))
}

/// Set hotend temperature without waiting (M104)
pub fn hotend_temperature(celsius: f64) -> String {
    format!("M104 S{}", format_number(celsius))
}

// ============================================================================
// QUERIES
// ============================================================================

/// Report current position (M114)
#[inline]
pub fn report_position() -> String {
    "M114".to_string()
}

/// Report firmware name and capabilities (M115)
#[inline]
pub fn firmware_info() -> String {
    "M115".to_string()
}
