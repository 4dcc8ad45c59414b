//! # Printer Session
//!
//! [`Ender`] is the object a caller drives: it owns the transport, the
//! machine profile and the tracked machine state, and turns method calls
//! into bounded GCode lines.
//!
//! ## Lifecycle
//!
//! ```text
//! connect / with_transport ──► initialize ──► rapid, linear, ... ──► print / teardown
//!                              G21, G90,
//!                              M203, M204
//! ```
//!
//! Every op is checked against the profile bounds before it is sent. A
//! rejected op is never sent and leaves the state unchanged. Dropping a
//! session releases the port even if [`Ender::teardown`] was not called.
//!
//! ## Example
//!
//! ```no_run
//! use ender::gcode::Axes;
//! use ender::settings::Settings;
//! use ender::Ender;
//!
//! # async fn example() -> ender::error::Result<()> {
//! let mut ender = Ender::connect(&Settings::default()).await?;
//! ender.rapid(Axes::new().x(10.0).y(10.0)).await?;
//! ender.linear(Axes::new().x(100.0).f(1500.0)).await?;
//! println!("{:?}", ender.get_position().await?);
//! ender.print(true).await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use crate::error::{EnderError, Result};
use crate::gcode::{Axes, DistanceMode, LengthUnits, MachineState, Op, Program, TimeUnits};
use crate::import::{self, ImportOptions};
use crate::printer::MachineProfile;
use crate::protocol::response::{self, Position};
use crate::settings::Settings;
use crate::transport::{SerialTransport, Transport, discovery};

pub struct Ender {
    transport: Box<dyn Transport>,
    profile: MachineProfile,
    state: MachineState,
}

impl Ender {
    /// Open the configured (or discovered) serial port and initialize.
    pub async fn connect(settings: &Settings) -> Result<Self> {
        let port = match &settings.serial.port {
            Some(port) => port.clone(),
            None => discovery::find_printer_port(&settings.serial).await?,
        };

        let mut transport = SerialTransport::open(&port, &settings.serial)?;
        transport
            .wait_for_start(settings.serial.startup_timeout())
            .await?;

        Self::with_transport(transport, settings.profile()).await
    }

    /// Initialize a session over any transport.
    pub async fn with_transport<T>(transport: T, profile: MachineProfile) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let mut ender = Self {
            transport: Box::new(transport),
            profile,
            state: MachineState::default(),
        };
        ender.initialize().await?;
        Ok(ender)
    }

    async fn initialize(&mut self) -> Result<()> {
        log::debug!(target: "ender", "Initializing {} on {}", self.profile.name, self.transport.describe());
        self.set_time_units(TimeUnits::Seconds);
        self.set_length_units(LengthUnits::Millimeters).await?;
        self.absolute_mode().await?;
        for line in self.profile.startup_lines() {
            self.write(line).await?;
        }
        Ok(())
    }

    /// Check, send, then commit one op.
    async fn emit(&mut self, op: Op) -> Result<Vec<String>> {
        if !self.transport.is_open() {
            return Err(EnderError::NotConnected);
        }

        let mut next = self.state.clone();
        next.apply(&op, &self.profile.bounds)?;

        let replies = match op.to_line(self.state.time_units) {
            Some(line) => self.transport.send_line(&line).await?,
            None => Vec::new(),
        };
        self.state = next;
        Ok(replies)
    }

    // ========== Motion ==========

    /// Rapid travel (G0).
    pub async fn rapid(&mut self, target: Axes) -> Result<()> {
        self.emit(Op::Rapid(target)).await.map(drop)
    }

    /// Linear move (G1).
    pub async fn linear(&mut self, target: Axes) -> Result<()> {
        self.emit(Op::Linear(target)).await.map(drop)
    }

    pub async fn dwell(&mut self, duration: Duration) -> Result<()> {
        self.emit(Op::Dwell(duration)).await.map(drop)
    }

    /// Home the selected axes; all axes when none are selected.
    pub async fn home(&mut self, x: bool, y: bool, z: bool) -> Result<()> {
        self.emit(Op::Home { x, y, z }).await.map(drop)
    }

    /// Redefine the current position (G92).
    pub async fn set_axis(&mut self, x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Result<()> {
        self.emit(Op::SetAxis { x, y, z }).await.map(drop)
    }

    // ========== Modes ==========

    pub async fn absolute_mode(&mut self) -> Result<()> {
        self.emit(Op::DistanceMode(DistanceMode::Absolute)).await.map(drop)
    }

    pub async fn relative_mode(&mut self) -> Result<()> {
        self.emit(Op::DistanceMode(DistanceMode::Relative)).await.map(drop)
    }

    pub async fn set_length_units(&mut self, units: LengthUnits) -> Result<()> {
        self.emit(Op::LengthUnits(units)).await.map(drop)
    }

    /// Select how dwell durations are written. Emits nothing.
    pub fn set_time_units(&mut self, units: TimeUnits) {
        self.state.time_units = units;
    }

    // ========== Coordinate systems ==========

    /// Select workpiece coordinate system 1-9 (G54-G59.3).
    ///
    /// With `zero_coords` the current X/Y becomes the origin (`G92 X0 Y0`).
    /// An index outside 1-9 is logged and ignored.
    pub async fn use_workpiece_coordinate_system(
        &mut self,
        number: u8,
        zero_coords: bool,
    ) -> Result<()> {
        if !(1..=9).contains(&number) {
            log::warn!(target: "ender", "available coordinate systems: 1-9 (got {})", number);
            return Ok(());
        }
        self.emit(Op::WorkpieceCoordinates(number)).await?;
        if zero_coords {
            self.set_axis(Some(0.0), Some(0.0), None).await?;
        }
        Ok(())
    }

    pub async fn use_machine_coordinate_system(&mut self) -> Result<()> {
        self.emit(Op::MachineCoordinates).await.map(drop)
    }

    // ========== Temperature ==========

    pub async fn set_bed_temperature(&mut self, celsius: f64) -> Result<()> {
        self.emit(Op::BedTemperature(celsius)).await.map(drop)
    }

    pub async fn set_hotend_temperature(&mut self, celsius: f64) -> Result<()> {
        self.emit(Op::HotendTemperature(celsius)).await.map(drop)
    }

    // ========== Queries / passthrough ==========

    /// Ask the firmware for its current position (M114).
    pub async fn get_position(&mut self) -> Result<Position> {
        let replies = self.emit(Op::ReportPosition).await?;
        response::parse_position(&replies)
            .ok_or_else(|| EnderError::Protocol("no position in M114 reply".to_string()))
    }

    /// Send a raw line verbatim. Blank lines are ignored.
    ///
    /// Raw lines bypass the bounds and are not reflected in the tracked state.
    pub async fn write(&mut self, line: &str) -> Result<Vec<String>> {
        self.emit(Op::Raw(line.to_string())).await
    }

    /// Validate a whole program from the current state, then stream it.
    pub async fn run(&mut self, program: &Program) -> Result<()> {
        program.validate_from(self.state.clone(), &self.profile.bounds)?;
        for op in program {
            self.emit(op.clone()).await?;
        }
        Ok(())
    }

    /// Replay the G0/G1 moves of a GCode file.
    pub async fn print_from_gcode<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: &ImportOptions,
    ) -> Result<()> {
        let program = import::load(path, options)?.optimize();
        self.run(&program).await
    }

    /// Finish the job: tear down the connection or just flush it.
    pub async fn print(&mut self, disconnect: bool) -> Result<()> {
        if disconnect {
            self.teardown().await
        } else {
            self.flush().await
        }
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.transport.flush().await
    }

    /// Flush and close the transport. Later calls are no-ops; every other
    /// operation fails with [`EnderError::NotConnected`].
    pub async fn teardown(&mut self) -> Result<()> {
        if !self.transport.is_open() {
            return Ok(());
        }
        self.transport.flush().await?;
        self.transport.close().await
    }

    // ========== Accessors ==========

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn profile(&self) -> &MachineProfile {
        &self.profile
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    pub fn describe(&self) -> String {
        self.transport.describe()
    }
}

impl Drop for Ender {
    fn drop(&mut self) {
        if self.transport.is_open() {
            log::debug!(target: "ender", "Releasing {} without teardown", self.transport.describe());
        }
    }
}
