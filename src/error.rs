//! # Error Types
//!
//! This module defines error types used throughout the ender library.

use thiserror::Error;

/// Result alias for ender operations.
pub type Result<T> = std::result::Result<T, EnderError>;

/// Main error type for ender operations
#[derive(Debug, Error)]
pub enum EnderError {
    /// Transport-level errors (write failures, closed streams)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Failed to open a serial port
    #[error("Failed to open serial port '{port}': {reason}")]
    PortOpen { port: String, reason: String },

    /// No candidate port answered the firmware probe
    #[error("Could not find an Ender-3 serial port")]
    PortNotFound,

    /// Operation attempted after teardown
    #[error("Printer connection is closed")]
    NotConnected,

    /// Printer did not acknowledge in time
    #[error("Timed out waiting for printer: {0}")]
    Timeout(String),

    /// Firmware reported an error line
    #[error("Firmware error: {0}")]
    Firmware(String),

    /// Malformed or missing reply
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A value fell outside the machine bounds
    #[error("{parameter} value {value} is outside bounds [{min}, {max}]")]
    OutOfBounds {
        parameter: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Invalid command or parameter
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// GCode file could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Invalid settings
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnderError {
    /// Creates a new transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a new port open error.
    #[must_use]
    pub fn port_open(port: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PortOpen {
            port: port.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new out-of-bounds error.
    #[must_use]
    pub fn out_of_bounds(parameter: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfBounds {
            parameter: parameter.into(),
            value,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_open_error() {
        let error = EnderError::port_open("/dev/ttyUSB0", "Permission denied");
        let msg = error.to_string();
        assert!(msg.contains("/dev/ttyUSB0"));
        assert!(msg.contains("Permission denied"));
    }

    #[test]
    fn test_out_of_bounds_error() {
        let error = EnderError::out_of_bounds("feed-rate", 9000.0, 50.0, 7000.0);
        assert_eq!(
            error.to_string(),
            "feed-rate value 9000 is outside bounds [50, 7000]"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.gcode");
        let error: EnderError = io.into();
        assert!(matches!(error, EnderError::Io(_)));
        assert!(error.to_string().contains("missing.gcode"));
    }
}
