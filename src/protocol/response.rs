//! # Marlin Replies
//!
//! Classification of the lines Marlin sends back over the serial link.
//!
//! ## Reply Lines
//!
//! | Line | Meaning |
//! |------|---------|
//! | `ok`, `ok T:20.1 /0.0` | Command accepted, send the next one |
//! | `echo:busy: processing` | Still executing, keep waiting |
//! | `Error:Printer halted. kill() called!` | Firmware error |
//! | `!! ...` | Fatal error on some builds |
//! | `X:10.00 Y:0.00 Z:5.00 E:0.00 Count X:800 Y:0 Z:2000` | M114 report |
//! | `FIRMWARE_NAME:Marlin bugfix-2.0.x ...` | M115 report |

use serde::Serialize;

/// A single classified reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Busy,
    Error(String),
    Echo(String),
    Other(String),
}

impl Reply {
    /// Classify a line (surrounding whitespace is ignored).
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line == "ok" || line.starts_with("ok ") {
            return Self::Ok;
        }
        if let Some(rest) = line.strip_prefix("echo:") {
            if rest.starts_with("busy:") {
                return Self::Busy;
            }
            return Self::Echo(rest.trim().to_string());
        }
        if let Some(rest) = line.strip_prefix("Error:") {
            return Self::Error(rest.trim().to_string());
        }
        if let Some(rest) = line.strip_prefix("!!") {
            return Self::Error(rest.trim().to_string());
        }
        Self::Other(line.to_string())
    }
}

/// A reported tool position in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Extract the position from an M114 reply.
///
/// Only the logical coordinates before `Count` are read; stepper counts
/// after it are ignored.
///
/// ```
/// use ender::protocol::response::parse_position;
///
/// let lines = ["X:10.00 Y:20.50 Z:0.20 E:0.00 Count X:800 Y:1640 Z:80".to_string()];
/// let position = parse_position(&lines).unwrap();
/// assert_eq!(position.as_array(), [10.0, 20.5, 0.2]);
/// ```
pub fn parse_position(lines: &[String]) -> Option<Position> {
    lines.iter().find_map(|line| parse_position_line(line))
}

fn parse_position_line(line: &str) -> Option<Position> {
    let logical = line.split("Count").next()?;
    let mut axes: [Option<f64>; 3] = [None; 3];

    for token in logical.split_whitespace() {
        let Some((axis, value)) = token.split_once(':') else {
            continue;
        };
        let index = match axis {
            "X" => 0,
            "Y" => 1,
            "Z" => 2,
            _ => continue,
        };
        axes[index] = value.parse().ok();
    }

    match axes {
        [Some(x), Some(y), Some(z)] => Some(Position { x, y, z }),
        _ => None,
    }
}

/// True when an M115 reply identifies Marlin firmware.
pub fn is_marlin(text: &str) -> bool {
    text.contains("Marlin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok() {
        assert_eq!(Reply::parse("ok"), Reply::Ok);
        assert_eq!(Reply::parse("ok\r"), Reply::Ok);
        assert_eq!(Reply::parse("ok T:20.0 /0.0 B:21.3 /0.0"), Reply::Ok);
        assert_ne!(Reply::parse("okay"), Reply::Ok);
    }

    #[test]
    fn test_parse_busy_and_echo() {
        assert_eq!(Reply::parse("echo:busy: processing"), Reply::Busy);
        assert_eq!(
            Reply::parse("echo:Unknown command: \"G999\""),
            Reply::Echo("Unknown command: \"G999\"".into())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Reply::parse("Error:Printer halted. kill() called!"),
            Reply::Error("Printer halted. kill() called!".into())
        );
        assert_eq!(
            Reply::parse("!! Thermal runaway"),
            Reply::Error("Thermal runaway".into())
        );
    }

    #[test]
    fn test_parse_other() {
        assert_eq!(
            Reply::parse("start"),
            Reply::Other("start".into())
        );
    }

    #[test]
    fn test_position_ignores_step_counts() {
        let lines = vec!["X:1.00 Y:2.00 Z:3.00 E:0.00 Count X:9 Y:9 Z:9".to_string()];
        let position = parse_position(&lines).unwrap();
        assert_eq!(position, Position { x: 1.0, y: 2.0, z: 3.0 });
    }

    #[test]
    fn test_position_skips_unrelated_lines() {
        let lines = vec![
            "echo:Active Extruder: 0".to_string(),
            "X:0.00 Y:235.00 Z:90.00 E:0.00 Count X:0 Y:18800 Z:36000".to_string(),
        ];
        assert_eq!(parse_position(&lines).unwrap().y, 235.0);
    }

    #[test]
    fn test_position_missing_axis() {
        let lines = vec!["X:1.00 Y:2.00 E:0.00".to_string()];
        assert!(parse_position(&lines).is_none());
        assert!(parse_position(&[]).is_none());
    }

    #[test]
    fn test_is_marlin() {
        assert!(is_marlin(
            "FIRMWARE_NAME:Marlin 1.1.9 (Github) SOURCE_CODE_URL:github.com/MarlinFirmware/Marlin"
        ));
        assert!(!is_marlin("FIRMWARE_NAME:Klipper"));
    }
}
