//! # Printer Transport Layer
//!
//! This module provides the backends that carry GCode lines to a printer.
//!
//! ## Available Transports
//!
//! - [`serial`]: USB-serial link to Marlin with `ok` acknowledgement
//! - [`file`]: Writes lines to a file or stdout (dry runs, `--output`)
//! - [`mock`]: In-memory recorder for tests
//!
//! Port discovery lives in [`discovery`].
//!
//! ## Flow Control
//!
//! Every line is acknowledged before the next one is sent. There is no
//! command queue, no line numbering, and no resend handling; a firmware
//! error or timeout surfaces to the caller unchanged.

use async_trait::async_trait;

use crate::error::Result;

pub mod discovery;
pub mod file;
pub mod mock;
pub mod serial;

pub use file::FileTransport;
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// A line-oriented connection to a printer.
#[async_trait]
pub trait Transport: Send {
    /// Send one line (without terminator) and wait for it to be accepted.
    ///
    /// Returns the informational lines received before the acknowledgement.
    async fn send_line(&mut self, line: &str) -> Result<Vec<String>>;

    /// Flush buffered output.
    async fn flush(&mut self) -> Result<()>;

    /// Flush and release the connection. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Human-readable target, e.g. the device path.
    fn describe(&self) -> String;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send_line(&mut self, line: &str) -> Result<Vec<String>> {
        (**self).send_line(line).await
    }

    async fn flush(&mut self) -> Result<()> {
        (**self).flush().await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
