//! # USB-Serial Transport
//!
//! This module streams GCode to Marlin firmware over a USB-serial port.
//!
//! ## Acknowledgement
//!
//! Marlin answers every accepted line with `ok`. After writing a line the
//! transport reads reply lines until it sees one:
//!
//! ```text
//! host  → G28
//! fw    ← echo:busy: processing     (keep waiting, timeout restarts)
//! fw    ← echo:busy: processing
//! fw    ← X:0.00 Y:0.00 Z:0.00 ...  (collected and returned)
//! fw    ← ok                        (done)
//! ```
//!
//! Comments after `;` are stripped before writing. A line that is only a
//! comment is not sent at all, since Marlin would never acknowledge it.
//!
//! An `Error:` line fails the send immediately. Silence longer than the
//! acknowledgement timeout is a [`EnderError::Timeout`].
//!
//! ## Board Reset
//!
//! Opening the port toggles DTR, which resets the Ender-3 mainboard. The
//! firmware prints `start` once it has booted; [`SerialTransport::wait_for_start`]
//! waits for it so the first command is not lost in the bootloader.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

use super::Transport;
use crate::error::{EnderError, Result};
use crate::protocol::Reply;
use crate::settings::SerialSettings;

/// Line the firmware prints after a reset.
const START_BANNER: &str = "start";

/// # Serial Printer Transport
///
/// Generic over the stream so tests can drive it with an in-memory duplex.
///
/// ## Example
///
/// ```no_run
/// use ender::settings::SerialSettings;
/// use ender::transport::{SerialTransport, Transport};
///
/// # async fn example() -> ender::error::Result<()> {
/// let settings = SerialSettings::default();
/// let mut transport = SerialTransport::open("/dev/ttyUSB0", &settings)?;
/// transport.send_line("G28").await?;
/// transport.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SerialTransport<S = SerialStream> {
    name: String,
    stream: Option<BufReader<S>>,
    /// Bytes of a reply line not yet terminated, kept across timeouts
    pending: Vec<u8>,
    ack_timeout: Duration,
}

impl SerialTransport<SerialStream> {
    /// Open a serial port with the configured baud rate and timeouts.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(port: &str, settings: &SerialSettings) -> Result<Self> {
        log::debug!(target: "ender", "Opening {} at {} baud", port, settings.baud_rate);

        let stream = tokio_serial::new(port, settings.baud_rate)
            .timeout(settings.timeout())
            .open_native_async()
            .map_err(|e| EnderError::port_open(port, e.to_string()))?;

        log::info!(target: "ender", "Connected to {}", port);
        Ok(Self::from_stream(port, stream, settings.ack_timeout()))
    }
}

impl<S> SerialTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already-open stream.
    pub fn from_stream(name: impl Into<String>, stream: S, ack_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            stream: Some(BufReader::new(stream)),
            pending: Vec::new(),
            ack_timeout,
        }
    }

    /// Wait until the firmware prints its boot banner.
    ///
    /// Returns `false` if `limit` passes first, which is normal when the
    /// board did not reset on open.
    pub async fn wait_for_start(&mut self, limit: Duration) -> Result<bool> {
        let stream = self.stream.as_mut().ok_or(EnderError::NotConnected)?;
        let deadline = tokio::time::Instant::now() + limit;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                log::debug!(target: "ender", "No start banner from {}", self.name);
                return Ok(false);
            }
            match read_reply_line(stream, &mut self.pending, remaining).await {
                Ok(line) if line == START_BANNER => {
                    log::debug!(target: "ender", "{} finished booting", self.name);
                    return Ok(true);
                }
                Ok(line) => log::debug!(target: "ender", "< {}", line),
                Err(EnderError::Timeout(_)) => return Ok(false),
                Err(e) => return Err(e),
            }
        }
    }
}

/// Read one line, trimmed of its terminator.
///
/// Partial input stays in `pending` when the limit passes, so the next call
/// resumes the same line.
async fn read_reply_line<R>(reader: &mut R, pending: &mut Vec<u8>, limit: Duration) -> Result<String>
where
    R: AsyncBufRead + Unpin,
{
    let read = tokio::time::timeout(limit, reader.read_until(b'\n', pending))
        .await
        .map_err(|_| EnderError::Timeout(format!("no reply within {:?}", limit)))??;

    if read == 0 {
        return Err(EnderError::transport("connection closed by printer"));
    }
    let line = String::from_utf8_lossy(pending).trim_end().to_string();
    pending.clear();
    Ok(line)
}

/// The part of a line Marlin acts on. Comment-only lines get no `ok`.
fn strip_comment(line: &str) -> &str {
    line.split(';').next().unwrap_or_default().trim()
}

#[async_trait]
impl<S> Transport for SerialTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_line(&mut self, line: &str) -> Result<Vec<String>> {
        let stream = self.stream.as_mut().ok_or(EnderError::NotConnected)?;

        let line = strip_comment(line);
        if line.is_empty() {
            return Ok(Vec::new());
        }

        log::debug!(target: "ender", "> {}", line);
        let mut frame = String::with_capacity(line.len() + 1);
        frame.push_str(line);
        frame.push('\n');
        stream
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| EnderError::transport(format!("Write failed: {}", e)))?;
        stream
            .flush()
            .await
            .map_err(|e| EnderError::transport(format!("Flush failed: {}", e)))?;

        let mut replies = Vec::new();
        loop {
            let reply = read_reply_line(stream, &mut self.pending, self.ack_timeout)
                .await
                .map_err(|e| match e {
                    EnderError::Timeout(msg) => EnderError::Timeout(format!("'{}': {}", line, msg)),
                    other => other,
                })?;
            log::debug!(target: "ender", "< {}", reply);

            match Reply::parse(&reply) {
                Reply::Ok => return Ok(replies),
                Reply::Busy => continue,
                Reply::Error(msg) => return Err(EnderError::Firmware(msg)),
                Reply::Echo(_) | Reply::Other(_) => {
                    if !reply.is_empty() {
                        replies.push(reply);
                    }
                }
            }
        }
    }

    async fn flush(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(EnderError::NotConnected)?;
        stream
            .flush()
            .await
            .map_err(|e| EnderError::transport(format!("Flush failed: {}", e)))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .shutdown()
                .await
                .map_err(|e| EnderError::transport(format!("Shutdown failed: {}", e)))?;
            log::info!(target: "ender", "Disconnected from {}", self.name);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{DuplexStream, duplex};

    const TIMEOUT: Duration = Duration::from_millis(500);

    /// A fake firmware that answers each received line with scripted replies.
    fn spawn_firmware<F>(printer: DuplexStream, mut respond: F) -> tokio::task::JoinHandle<Vec<String>>
    where
        F: FnMut(&str) -> Vec<&'static str> + Send + 'static,
    {
        tokio::spawn(async move {
            let (read, mut write) = tokio::io::split(printer);
            let mut lines = BufReader::new(read).lines();
            let mut received = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                for reply in respond(&line) {
                    if write.write_all(format!("{}\n", reply).as_bytes()).await.is_err() {
                        return received;
                    }
                }
                received.push(line);
            }
            received
        })
    }

    #[tokio::test]
    async fn test_send_waits_for_ok() {
        let (host, printer) = duplex(1024);
        let firmware = spawn_firmware(printer, |_| vec!["ok"]);

        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        assert!(transport.send_line("G21").await.unwrap().is_empty());
        assert!(transport.send_line("G90").await.unwrap().is_empty());
        transport.close().await.unwrap();

        assert_eq!(firmware.await.unwrap(), vec!["G21", "G90"]);
    }

    #[tokio::test]
    async fn test_busy_lines_are_skipped_and_info_collected() {
        let (host, printer) = duplex(1024);
        spawn_firmware(printer, |line| match line {
            "M114" => vec![
                "echo:busy: processing",
                "X:1.00 Y:2.00 Z:3.00 E:0.00 Count X:80 Y:160 Z:1200",
                "ok",
            ],
            _ => vec!["ok"],
        });

        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        let replies = transport.send_line("M114").await.unwrap();
        assert_eq!(
            replies,
            vec!["X:1.00 Y:2.00 Z:3.00 E:0.00 Count X:80 Y:160 Z:1200"]
        );
    }

    #[tokio::test]
    async fn test_firmware_error() {
        let (host, printer) = duplex(1024);
        spawn_firmware(printer, |_| vec!["Error:Printer halted. kill() called!"]);

        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        let result = transport.send_line("G1 X10").await;
        match result {
            Err(EnderError::Firmware(msg)) => assert!(msg.contains("Printer halted")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_silence_times_out() {
        let (host, printer) = duplex(1024);
        spawn_firmware(printer, |_| vec![]);

        let mut transport =
            SerialTransport::from_stream("duplex", host, Duration::from_millis(50));
        let result = transport.send_line("G28").await;
        assert!(matches!(result, Err(EnderError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_closed_stream_is_transport_error() {
        let (host, printer) = duplex(1024);
        drop(printer);

        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        let result = transport.send_line("G28").await;
        assert!(matches!(result, Err(EnderError::Transport(_))));
    }

    #[tokio::test]
    async fn test_send_after_close() {
        let (host, _printer) = duplex(1024);
        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        transport.close().await.unwrap();
        transport.close().await.unwrap();

        assert!(!transport.is_open());
        assert!(matches!(
            transport.send_line("G28").await,
            Err(EnderError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_wait_for_start_banner() {
        let (host, mut printer) = duplex(1024);
        printer
            .write_all(b"echo: External Reset\nMarlin 1.1.9\nstart\n")
            .await
            .unwrap();

        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        assert!(transport.wait_for_start(TIMEOUT).await.unwrap());
    }

    #[tokio::test]
    async fn test_comment_only_lines_are_not_sent() {
        let (host, printer) = duplex(1024);
        // Real firmware stays silent for comment-only lines
        let firmware = spawn_firmware(printer, |line| {
            if line.trim_start().starts_with(';') {
                vec![]
            } else {
                vec!["ok"]
            }
        });

        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        assert!(transport.send_line("; layer 1").await.unwrap().is_empty());
        assert!(transport.send_line("   ").await.unwrap().is_empty());
        transport.send_line("G1 X10 ; first edge").await.unwrap();
        transport.close().await.unwrap();

        assert_eq!(firmware.await.unwrap(), vec!["G1 X10"]);
    }

    #[tokio::test]
    async fn test_partial_line_survives_timeout() {
        let (host, mut printer) = duplex(1024);
        printer.write_all(b"echo:Marlin 1.1").await.unwrap();

        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        assert!(!transport.wait_for_start(Duration::from_millis(30)).await.unwrap());

        printer.write_all(b".9\nok\n").await.unwrap();
        let replies = transport.send_line("M115").await.unwrap();
        assert_eq!(replies, vec!["echo:Marlin 1.1.9"]);
    }

    #[tokio::test]
    async fn test_wait_for_start_gives_up_quietly() {
        let (host, _printer) = duplex(1024);
        let mut transport = SerialTransport::from_stream("duplex", host, TIMEOUT);
        assert!(!transport.wait_for_start(Duration::from_millis(30)).await.unwrap());
    }
}
