//! # Program Optimizer
//!
//! Passes that shrink a program without changing what the printer does.
//!
//! ## Optimization Passes
//!
//! 1. **Remove empty moves**: G0/G1 with no words
//! 2. **Remove redundant modes**: G90/G91, G20/G21 and coordinate system
//!    selections that repeat the active one
//!
//! Ops are never reordered.

use super::ops::{CoordinateSystem, DistanceMode, LengthUnits, Op, Program};

impl Program {
    /// Apply all optimization passes.
    pub fn optimize(self) -> Self {
        let ops = self.ops;
        let ops = remove_empty_moves(ops);
        let ops = remove_redundant_modes(ops);
        Program { ops }
    }
}

fn remove_empty_moves(ops: Vec<Op>) -> Vec<Op> {
    ops.into_iter()
        .filter(|op| !matches!(op, Op::Rapid(axes) | Op::Linear(axes) if axes.is_empty()))
        .collect()
}

/// Modes as last emitted. `None` is unknown, so the first selection is kept.
#[derive(Default)]
struct ModeState {
    distance: Option<DistanceMode>,
    units: Option<LengthUnits>,
    coordinates: Option<CoordinateSystem>,
}

fn remove_redundant_modes(ops: Vec<Op>) -> Vec<Op> {
    let mut result = Vec::with_capacity(ops.len());
    let mut state = ModeState::default();

    for op in ops {
        match &op {
            Op::DistanceMode(mode) => {
                if state.distance == Some(*mode) {
                    continue;
                }
                state.distance = Some(*mode);
            }
            Op::LengthUnits(units) => {
                if state.units == Some(*units) {
                    continue;
                }
                state.units = Some(*units);
            }
            Op::MachineCoordinates => {
                if state.coordinates == Some(CoordinateSystem::Machine) {
                    continue;
                }
                state.coordinates = Some(CoordinateSystem::Machine);
            }
            Op::WorkpieceCoordinates(number) => {
                let system = CoordinateSystem::Workpiece(*number);
                if state.coordinates == Some(system) {
                    continue;
                }
                state.coordinates = Some(system);
            }
            // A raw line may change any mode behind our back.
            Op::Raw(_) => state = ModeState::default(),
            _ => {}
        }
        result.push(op);
    }

    result
}
