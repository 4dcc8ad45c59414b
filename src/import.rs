//! # GCode Import
//!
//! Reads G0/G1 moves from an existing GCode file so they can be replayed
//! through a session with bounds checking.
//!
//! ## Rewriting Rules
//!
//! - Everything after `;` is a comment and dropped.
//! - `G0`/`G00` become rapid moves, `G1`/`G01` linear moves.
//! - X, Y and Z are multiplied by the scale factor; F is not.
//! - When a feed-rate override is configured for the move kind it replaces
//!   any `F` word in the file.
//! - Every other command (including extrusion `E` words) is skipped.
//!
//! ```
//! use ender::import::{parse_str, ImportOptions};
//!
//! let options = ImportOptions { scale: 2.0, ..Default::default() };
//! let program = parse_str("G1 X5 Y5 F900 ; corner\nM104 S200\n", &options)?;
//! assert_eq!(program.to_text(), "G1 X10 Y10 F900\n");
//! # Ok::<(), ender::EnderError>(())
//! ```

use std::path::Path;

use crate::error::{EnderError, Result};
use crate::gcode::{Axes, Op, Program};

/// Move rewriting options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    /// Replaces F on G0 moves when set
    pub rapid_feedrate: Option<f64>,
    /// Replaces F on G1 moves when set
    pub move_feedrate: Option<f64>,
    /// Multiplier applied to X, Y and Z
    pub scale: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            rapid_feedrate: None,
            move_feedrate: None,
            scale: 1.0,
        }
    }
}

/// Parse one line. `number` is 1-based and only used for error reporting.
pub fn parse_line(number: usize, line: &str, options: &ImportOptions) -> Result<Option<Op>> {
    let code = line.split(';').next().unwrap_or_default();
    let mut words = code.split_whitespace();

    let Some(command) = words.next() else {
        return Ok(None);
    };
    let (is_rapid, feed_override) = match command {
        "G0" | "G00" => (true, options.rapid_feedrate),
        "G1" | "G01" => (false, options.move_feedrate),
        _ => {
            log::trace!("skipping line {}: {}", number, code.trim());
            return Ok(None);
        }
    };

    let mut axes = Axes::new();
    let mut file_feed = None;
    for word in words {
        let mut chars = word.chars();
        let letter = chars.next().unwrap_or_default();
        let slot = match letter {
            'X' => &mut axes.x,
            'Y' => &mut axes.y,
            'Z' => &mut axes.z,
            'F' => &mut file_feed,
            _ => continue,
        };
        let value: f64 = chars.as_str().parse().map_err(|_| EnderError::Parse {
            line: number,
            message: format!("invalid number in word '{}'", word),
        })?;
        // First occurrence wins, like the firmware's own parser
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    axes.x = axes.x.map(|v| v * options.scale);
    axes.y = axes.y.map(|v| v * options.scale);
    axes.z = axes.z.map(|v| v * options.scale);
    axes.f = feed_override.or(file_feed);

    log::debug!("line {}: {:?}", number, axes);
    Ok(Some(if is_rapid {
        Op::Rapid(axes)
    } else {
        Op::Linear(axes)
    }))
}

/// Parse GCode text into a program of moves.
pub fn parse_str(text: &str, options: &ImportOptions) -> Result<Program> {
    let mut program = Program::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(op) = parse_line(index + 1, line, options)? {
            program.push(op);
        }
    }
    Ok(program)
}

/// Read and parse a GCode file.
pub fn load<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<Program> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    log::debug!("read contents: {}", path.display());
    let program = parse_str(&text, options)?;
    log::info!("{}: {} moves", path.display(), program.len());
    Ok(program)
}
