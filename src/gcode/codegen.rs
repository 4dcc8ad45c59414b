//! # Code Generation
//!
//! Converts ops and programs to GCode text lines.

use super::ops::{DistanceMode, LengthUnits, Op, Program, TimeUnits};
use crate::protocol::commands;

impl Op {
    /// Compile a single op to a line.
    ///
    /// Returns `None` for ops that produce nothing (moves without words,
    /// blank raw lines, out-of-range coordinate systems).
    pub fn to_line(&self, time_units: TimeUnits) -> Option<String> {
        let line = match self {
            // ===== Motion =====
            Op::Rapid(axes) | Op::Linear(axes) if axes.is_empty() => return None,
            Op::Rapid(axes) => commands::rapid(axes.x, axes.y, axes.z, axes.f),
            Op::Linear(axes) => commands::linear(axes.x, axes.y, axes.z, axes.f),
            Op::Dwell(duration) => match time_units {
                TimeUnits::Seconds => commands::dwell_seconds(duration.as_secs_f64()),
                TimeUnits::Milliseconds => {
                    commands::dwell_millis(duration.as_secs_f64() * 1000.0)
                }
            },
            Op::Home { x, y, z } => commands::home(*x, *y, *z),
            Op::SetAxis { x, y, z } => commands::set_axis(*x, *y, *z),

            // ===== Modes =====
            Op::DistanceMode(DistanceMode::Absolute) => commands::absolute(),
            Op::DistanceMode(DistanceMode::Relative) => commands::relative(),
            Op::LengthUnits(LengthUnits::Millimeters) => commands::units_mm(),
            Op::LengthUnits(LengthUnits::Inches) => commands::units_inch(),
            Op::MachineCoordinates => commands::machine_coordinates(),
            Op::WorkpieceCoordinates(number) => commands::workpiece_coordinates(*number)?,

            // ===== Temperature =====
            Op::BedTemperature(celsius) => commands::bed_temperature(*celsius),
            Op::HotendTemperature(celsius) => commands::hotend_temperature(*celsius),

            // ===== Queries / passthrough =====
            Op::ReportPosition => commands::report_position(),
            Op::Raw(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                text.to_string()
            }
            Op::Comment(text) => format!("; {}", text.trim()),
        };
        Some(line)
    }
}

impl Program {
    /// Compile the program to lines, skipping ops that produce nothing.
    pub fn to_lines(&self, time_units: TimeUnits) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| op.to_line(time_units))
            .collect()
    }

    /// Compile the program to newline-terminated text with dwells in seconds.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for line in self.to_lines(TimeUnits::Seconds) {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::Axes;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_motion_lines() {
        let op = Op::Rapid(Axes::new().x(10.0).y(20.0).f(3000.0));
        assert_eq!(op.to_line(TimeUnits::Seconds).as_deref(), Some("G0 X10 Y20 F3000"));

        let op = Op::Linear(Axes::new().z(0.2));
        assert_eq!(op.to_line(TimeUnits::Seconds).as_deref(), Some("G1 Z0.2"));
    }

    #[test]
    fn test_empty_move_produces_nothing() {
        assert_eq!(Op::Rapid(Axes::new()).to_line(TimeUnits::Seconds), None);
        assert_eq!(Op::Raw("   ".into()).to_line(TimeUnits::Seconds), None);
    }

    #[test]
    fn test_dwell_follows_time_units() {
        let op = Op::Dwell(Duration::from_millis(1500));
        assert_eq!(op.to_line(TimeUnits::Seconds).as_deref(), Some("G4 S1.5"));
        assert_eq!(op.to_line(TimeUnits::Milliseconds).as_deref(), Some("G4 P1500"));
    }

    #[test]
    fn test_invalid_workpiece_system_produces_nothing() {
        assert_eq!(Op::WorkpieceCoordinates(0).to_line(TimeUnits::Seconds), None);
        assert_eq!(
            Op::WorkpieceCoordinates(8).to_line(TimeUnits::Seconds).as_deref(),
            Some("G59.2")
        );
    }

    #[test]
    fn test_program_to_text() {
        let program: Program = vec![
            Op::Comment("square".into()),
            Op::LengthUnits(LengthUnits::Millimeters),
            Op::DistanceMode(DistanceMode::Absolute),
            Op::Raw("M203 X5000 Y5000 Z10.0".into()),
            Op::Linear(Axes::new()),
            Op::Linear(Axes::new().x(5.0).y(5.0)),
            Op::ReportPosition,
        ]
        .into_iter()
        .collect();

        assert_eq!(
            program.to_text(),
            "; square\nG21\nG90\nM203 X5000 Y5000 Z10.0\nG1 X5 Y5\nM114\n"
        );
    }
}
