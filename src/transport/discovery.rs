//! # Port Discovery
//!
//! Finds the printer among the system's serial ports.
//!
//! ## Search
//!
//! 1. Enumerate ports with `tokio_serial::available_ports()`.
//! 2. Keep candidates: on Linux only `ttyUSB*` devices (the Ender-3 uses a
//!    CH340 bridge), and never USB ports reporting a manufacturer string.
//! 3. Probe each candidate: send `M115`, wait, and look for `Marlin` in
//!    whatever came back.
//!
//! Ports that fail to open or answer are skipped with a warning.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_serial::{SerialPortBuilderExt, SerialPortInfo, SerialPortType};

use crate::error::{EnderError, Result};
use crate::protocol::{commands, response};
use crate::settings::SerialSettings;

/// How long to keep draining once the probe reply has started.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(50);

/// A port as shown by `ender ports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDescription {
    pub name: String,
    pub kind: String,
    pub candidate: bool,
}

/// True if `info` could be an Ender-3.
pub fn is_candidate(info: &SerialPortInfo, linux: bool) -> bool {
    if linux && !info.port_name.contains("ttyUSB") {
        return false;
    }
    match &info.port_type {
        SerialPortType::UsbPort(usb) => usb.manufacturer.is_none(),
        _ => true,
    }
}

/// Names of candidate ports, in enumeration order.
pub fn list_candidates(ports: &[SerialPortInfo], linux: bool) -> Vec<String> {
    ports
        .iter()
        .filter(|info| is_candidate(info, linux))
        .map(|info| info.port_name.clone())
        .collect()
}

fn describe_kind(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let mut kind = format!("USB {:04x}:{:04x}", usb.vid, usb.pid);
            if let Some(product) = &usb.product {
                kind.push(' ');
                kind.push_str(product);
            }
            kind
        }
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        _ => "unknown".to_string(),
    }
}

/// List every serial port on the system.
pub fn describe_ports() -> Result<Vec<PortDescription>> {
    let linux = cfg!(target_os = "linux");
    let ports = tokio_serial::available_ports()
        .map_err(|e| EnderError::transport(format!("Failed to list serial ports: {}", e)))?;

    Ok(ports
        .iter()
        .map(|info| PortDescription {
            name: info.port_name.clone(),
            kind: describe_kind(&info.port_type),
            candidate: is_candidate(info, linux),
        })
        .collect())
}

/// Send `M115` over `stream` and check whether Marlin answers.
pub async fn probe<S>(mut stream: S, delay: Duration) -> Result<bool>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let query = format!("{}\r\n", commands::firmware_info());
    stream.write_all(query.as_bytes()).await?;
    stream.flush().await?;
    tokio::time::sleep(delay).await;

    let mut received = Vec::new();
    let mut buffer = [0u8; 256];
    loop {
        match tokio::time::timeout(DRAIN_TIMEOUT, stream.read(&mut buffer)).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(n)) => received.extend_from_slice(&buffer[..n]),
            Ok(Err(e)) => return Err(e.into()),
        }
    }

    let text = String::from_utf8_lossy(&received);
    log::debug!(target: "ender", "port response: {:?}", text);
    Ok(response::is_marlin(&text))
}

/// Find the printer's port by probing every candidate.
///
/// Candidates are opened at the configured baud rate (115200 by default).
pub async fn find_printer_port(settings: &SerialSettings) -> Result<String> {
    log::debug!(target: "ender", "start ender serial port search");
    let ports = tokio_serial::available_ports()
        .map_err(|e| EnderError::transport(format!("Failed to list serial ports: {}", e)))?;
    let candidates = list_candidates(&ports, cfg!(target_os = "linux"));

    search(candidates, settings.probe_delay(), |name| {
        tokio_serial::new(name, settings.baud_rate)
            .timeout(settings.timeout())
            .open_native_async()
            .map_err(|e| EnderError::port_open(name, e.to_string()))
    })
    .await
}

/// Probe `candidates` in order and return the first that answers as Marlin.
///
/// A port that fails to open or probe is skipped with a warning.
pub async fn search<S, F>(candidates: Vec<String>, delay: Duration, mut open: F) -> Result<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FnMut(&str) -> Result<S>,
{
    for name in candidates {
        log::debug!(target: "ender", "trying port: {}", name);

        let stream = match open(&name) {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!(target: "ender", "Skipping {}: {}", name, e);
                continue;
            }
        };

        match probe(stream, delay).await {
            Ok(true) => {
                log::info!(target: "ender", "found port: {}", name);
                return Ok(name);
            }
            Ok(false) => {}
            Err(e) => log::warn!(target: "ender", "Probe of {} failed: {}", name, e),
        }
    }

    Err(EnderError::PortNotFound)
}
