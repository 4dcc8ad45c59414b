//! # Machine State
//!
//! Host-side model of the printer's modal state and position. Every op is
//! checked against the machine [`Bounds`] here before it is committed.
//!
//! ## Position Model
//!
//! The position is tracked in millimeters in the active frame, starting at
//! the origin. `G92` redefines it without a bounds check, so bounds are
//! always relative to the frame the host has established. Workpiece offsets
//! stored in the firmware are not known to the host.

use super::ops::{CoordinateSystem, DistanceMode, LengthUnits, Op, Program, TimeUnits};
use crate::error::{EnderError, Result};
use crate::printer::Bounds;

/// Modal state tracked across ops.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineState {
    pub units: LengthUnits,
    pub distance: DistanceMode,
    pub time_units: TimeUnits,
    pub coordinates: CoordinateSystem,
    /// X/Y/Z in millimeters
    pub position: [f64; 3],
}

impl Default for MachineState {
    fn default() -> Self {
        Self {
            units: LengthUnits::Millimeters,
            distance: DistanceMode::Absolute,
            time_units: TimeUnits::Seconds,
            coordinates: CoordinateSystem::default(),
            position: [0.0; 3],
        }
    }
}

impl MachineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position each given axis would reach. Absent axes stay `None`.
    pub fn target(&self, xyz: [Option<f64>; 3]) -> [Option<f64>; 3] {
        let mut target = [None; 3];
        for (index, value) in xyz.iter().enumerate() {
            if let Some(value) = value {
                let mm = self.units.to_mm(*value);
                target[index] = Some(match self.distance {
                    DistanceMode::Absolute => mm,
                    DistanceMode::Relative => self.position[index] + mm,
                });
            }
        }
        target
    }

    /// Check an op against `bounds` without changing state.
    pub fn check(&self, op: &Op, bounds: &Bounds) -> Result<()> {
        match op {
            Op::Rapid(axes) | Op::Linear(axes) => {
                if let Some(f) = axes.f {
                    bounds.feed_rate.check("feed-rate", self.units.to_mm(f))?;
                }
                bounds.axes.check(self.target(axes.xyz()))
            }
            Op::WorkpieceCoordinates(number) if !(1..=9).contains(number) => {
                Err(EnderError::InvalidCommand(format!(
                    "workpiece coordinate system {} (available: 1-9)",
                    number
                )))
            }
            Op::BedTemperature(celsius) => {
                bounds.bed_temperature.check("bed-temperature", *celsius)
            }
            Op::HotendTemperature(celsius) => {
                bounds.hotend_temperature.check("hotend-temperature", *celsius)
            }
            _ => Ok(()),
        }
    }

    /// Check an op and, if it passes, commit its effect.
    ///
    /// A rejected op leaves the state untouched.
    pub fn apply(&mut self, op: &Op, bounds: &Bounds) -> Result<()> {
        self.check(op, bounds)?;

        match op {
            Op::Rapid(axes) | Op::Linear(axes) => {
                for (index, value) in self.target(axes.xyz()).iter().enumerate() {
                    if let Some(value) = value {
                        self.position[index] = *value;
                    }
                }
            }
            Op::Home { x, y, z } => {
                let all = !(*x || *y || *z);
                for (index, selected) in [*x, *y, *z].iter().enumerate() {
                    if all || *selected {
                        self.position[index] = bounds.axes.min[index];
                    }
                }
            }
            Op::SetAxis { x, y, z } => {
                for (index, value) in [*x, *y, *z].iter().enumerate() {
                    if let Some(value) = value {
                        self.position[index] = self.units.to_mm(*value);
                    }
                }
            }
            Op::DistanceMode(mode) => self.distance = *mode,
            Op::LengthUnits(units) => self.units = *units,
            Op::MachineCoordinates => self.coordinates = CoordinateSystem::Machine,
            Op::WorkpieceCoordinates(number) => {
                self.coordinates = CoordinateSystem::Workpiece(*number)
            }
            _ => {}
        }

        Ok(())
    }
}

impl Program {
    /// Check every op against `bounds`, starting from a fresh state.
    pub fn validate(&self, bounds: &Bounds) -> Result<MachineState> {
        self.validate_from(MachineState::default(), bounds)
    }

    /// Check every op against `bounds`, starting from `state`.
    pub fn validate_from(&self, mut state: MachineState, bounds: &Bounds) -> Result<MachineState> {
        for op in &self.ops {
            state.apply(op, bounds)?;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcode::Axes;
    use crate::printer::MachineProfile;

    const BOUNDS: Bounds = MachineProfile::ENDER3.bounds;

    #[test]
    fn test_absolute_move_updates_position() {
        let mut state = MachineState::new();
        state
            .apply(&Op::Linear(Axes::new().x(100.0).y(50.0)), &BOUNDS)
            .unwrap();
        assert_eq!(state.position, [100.0, 50.0, 0.0]);
    }

    #[test]
    fn test_relative_moves_accumulate() {
        let mut state = MachineState::new();
        state
            .apply(&Op::DistanceMode(DistanceMode::Relative), &BOUNDS)
            .unwrap();
        for _ in 0..3 {
            state.apply(&Op::Linear(Axes::new().x(10.0)), &BOUNDS).unwrap();
        }
        assert_eq!(state.position[0], 30.0);
    }

    #[test]
    fn test_relative_move_out_of_bounds() {
        let mut state = MachineState::new();
        state.apply(&Op::Linear(Axes::new().z(80.0)), &BOUNDS).unwrap();
        state
            .apply(&Op::DistanceMode(DistanceMode::Relative), &BOUNDS)
            .unwrap();

        let result = state.apply(&Op::Linear(Axes::new().z(20.0)), &BOUNDS);
        assert!(matches!(result, Err(EnderError::OutOfBounds { .. })));
        assert_eq!(state.position[2], 80.0);
    }

    #[test]
    fn test_feed_rate_bounds() {
        let mut state = MachineState::new();
        assert!(state.apply(&Op::Rapid(Axes::new().f(7000.0)), &BOUNDS).is_ok());
        assert!(state.apply(&Op::Rapid(Axes::new().f(7001.0)), &BOUNDS).is_err());
        assert!(state.apply(&Op::Rapid(Axes::new().f(49.0)), &BOUNDS).is_err());
    }

    #[test]
    fn test_inch_units_are_converted() {
        let mut state = MachineState::new();
        state.apply(&Op::LengthUnits(LengthUnits::Inches), &BOUNDS).unwrap();
        state.apply(&Op::Linear(Axes::new().x(9.0)), &BOUNDS).unwrap();
        assert!((state.position[0] - 228.6).abs() < 1e-9);

        // 10 in = 254 mm is past the 235 mm bed
        assert!(state.apply(&Op::Linear(Axes::new().x(10.0)), &BOUNDS).is_err());
    }

    #[test]
    fn test_negative_position_rejected() {
        let mut state = MachineState::new();
        let result = state.apply(&Op::Rapid(Axes::new().x(-1.0)), &BOUNDS);
        match result {
            Err(EnderError::OutOfBounds { parameter, value, .. }) => {
                assert_eq!(parameter, "axes.X");
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_set_axis_redefines_origin() {
        let mut state = MachineState::new();
        state.apply(&Op::Linear(Axes::new().x(100.0)), &BOUNDS).unwrap();
        state
            .apply(
                &Op::SetAxis {
                    x: Some(0.0),
                    y: Some(0.0),
                    z: None,
                },
                &BOUNDS,
            )
            .unwrap();
        assert_eq!(state.position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_home_resets_selected_axes() {
        let mut state = MachineState::new();
        state
            .apply(&Op::Linear(Axes::new().x(10.0).y(20.0).z(30.0)), &BOUNDS)
            .unwrap();
        state
            .apply(
                &Op::Home {
                    x: false,
                    y: false,
                    z: true,
                },
                &BOUNDS,
            )
            .unwrap();
        assert_eq!(state.position, [10.0, 20.0, 0.0]);

        state
            .apply(
                &Op::Home {
                    x: false,
                    y: false,
                    z: false,
                },
                &BOUNDS,
            )
            .unwrap();
        assert_eq!(state.position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_temperature_bounds() {
        let mut state = MachineState::new();
        assert!(state.apply(&Op::BedTemperature(60.0), &BOUNDS).is_ok());
        assert!(state.apply(&Op::BedTemperature(110.0), &BOUNDS).is_err());
        assert!(state.apply(&Op::HotendTemperature(210.0), &BOUNDS).is_ok());
        assert!(state.apply(&Op::HotendTemperature(300.0), &BOUNDS).is_err());
    }

    #[test]
    fn test_workpiece_range() {
        let mut state = MachineState::new();
        state.apply(&Op::WorkpieceCoordinates(9), &BOUNDS).unwrap();
        assert_eq!(state.coordinates, CoordinateSystem::Workpiece(9));
        assert!(matches!(
            state.apply(&Op::WorkpieceCoordinates(10), &BOUNDS),
            Err(EnderError::InvalidCommand(_))
        ));
        state.apply(&Op::MachineCoordinates, &BOUNDS).unwrap();
        assert_eq!(state.coordinates, CoordinateSystem::Machine);
    }

    #[test]
    fn test_program_validate_stops_at_first_violation() {
        let program: Program = vec![
            Op::Linear(Axes::new().x(10.0)),
            Op::Linear(Axes::new().x(500.0)),
        ]
        .into_iter()
        .collect();
        assert!(program.validate(&BOUNDS).is_err());

        let program: Program = vec![Op::Linear(Axes::new().x(10.0))].into_iter().collect();
        assert_eq!(program.validate(&BOUNDS).unwrap().position[0], 10.0);
    }
}
