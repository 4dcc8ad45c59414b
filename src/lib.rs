//! # Ender - Ender-3 GCode Streaming Library
//!
//! Ender is a Rust library for driving Creality Ender-3 printers (and other
//! Marlin machines) over USB-serial. It provides:
//!
//! - **Protocol implementation**: GCode line builders and Marlin reply parsing
//! - **Programs**: Typed ops with bounds checking, optimization and codegen
//! - **Import**: Replaying G0/G1 moves from existing GCode files
//! - **Transport**: USB-serial with `ok` acknowledgement, file output, mock
//!
//! ## Quick Start
//!
//! ```no_run
//! use ender::{gcode::Axes, settings::Settings, Ender};
//!
//! # async fn example() -> ender::error::Result<()> {
//! // Find the printer, open it and send the startup lines
//! let mut ender = Ender::connect(&Settings::default()).await?;
//!
//! ender.home(false, false, false).await?;
//! ender.use_workpiece_coordinate_system(1, false).await?;
//! ender.rapid(Axes::new().x(20.0).y(20.0).z(5.0)).await?;
//! ender.linear(Axes::new().x(120.0).f(1200.0)).await?;
//!
//! // Flush and release the port
//! ender.print(true).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`session`] | The [`Ender`] session object |
//! | [`gcode`] | Ops, programs, machine state |
//! | [`import`] | GCode file import |
//! | [`protocol`] | GCode builders and reply parsing |
//! | [`transport`] | Serial, file and mock backends, port discovery |
//! | [`printer`] | Machine profiles and bounds |
//! | [`settings`] | TOML settings |
//! | [`error`] | Error types |
//!
//! ## Logging
//!
//! Diagnostics go through the `log` facade under the `ender` target
//! (`ender::import` for file import). Binaries pick the backend; the CLI
//! uses `env_logger`, so `RUST_LOG=ender=debug` shows every line sent.

pub mod error;
pub mod gcode;
pub mod import;
pub mod printer;
pub mod protocol;
pub mod session;
pub mod settings;
pub mod transport;

// Re-exports for convenience
pub use error::EnderError;
pub use printer::MachineProfile;
pub use session::Ender;
pub use settings::Settings;
