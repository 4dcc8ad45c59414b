//! # File Transport
//!
//! Writes GCode lines to a file or stdout instead of a printer. Used for
//! dry runs and for saving a session as a `.gcode` file. Every line is
//! accepted immediately and no replies are ever returned.

use std::path::Path;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout};

use super::Transport;
use crate::error::{EnderError, Result};

pub struct FileTransport<W> {
    name: String,
    writer: Option<W>,
    lines_written: usize,
}

impl FileTransport<BufWriter<File>> {
    /// Create (or truncate) a GCode file.
    pub async fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).await.map_err(|e| {
            EnderError::transport(format!("Failed to create {}: {}", path.display(), e))
        })?;
        log::info!(target: "ender", "Writing GCode to {}", path.display());
        Ok(Self::new(path.display().to_string(), BufWriter::new(file)))
    }
}

impl FileTransport<Stdout> {
    pub fn stdout() -> Self {
        Self::new("<stdout>", tokio::io::stdout())
    }
}

impl<W> FileTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(name: impl Into<String>, writer: W) -> Self {
        Self {
            name: name.into(),
            writer: Some(writer),
            lines_written: 0,
        }
    }

    /// Write a `; generated by ...` comment line with a UTC timestamp.
    pub async fn write_header(&mut self) -> Result<()> {
        let header = format!(
            "; generated by ender {} at {}",
            env!("CARGO_PKG_VERSION"),
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        self.send_line(&header).await.map(|_| ())
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// The underlying writer, while still open.
    pub fn get_ref(&self) -> Option<&W> {
        self.writer.as_ref()
    }
}

#[async_trait]
impl<W> Transport for FileTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_line(&mut self, line: &str) -> Result<Vec<String>> {
        let writer = self.writer.as_mut().ok_or(EnderError::NotConnected)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        self.lines_written += 1;
        Ok(Vec::new())
    }

    async fn flush(&mut self) -> Result<()> {
        let writer = self.writer.as_mut().ok_or(EnderError::NotConnected)?;
        writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
            log::debug!(target: "ender", "Wrote {} lines to {}", self.lines_written, self.name);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_lines_are_newline_terminated() {
        let mut transport = FileTransport::new("memory", Vec::new());
        transport.send_line("G21").await.unwrap();
        transport.send_line("G1 X10").await.unwrap();

        assert_eq!(transport.lines_written(), 2);
        assert_eq!(transport.get_ref().unwrap().as_slice(), b"G21\nG1 X10\n");
    }

    #[tokio::test]
    async fn test_header_is_a_comment() {
        let mut transport = FileTransport::new("memory", Vec::new());
        transport.write_header().await.unwrap();

        let text = String::from_utf8(transport.get_ref().unwrap().clone()).unwrap();
        assert!(text.starts_with("; generated by ender "));
        assert!(text.ends_with("Z\n"));
    }

    #[tokio::test]
    async fn test_create_writes_file_on_close() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.gcode");

        let mut transport = FileTransport::create(&path).await.unwrap();
        transport.send_line("G28").await.unwrap();
        transport.close().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "G28\n");
        assert!(matches!(
            transport.send_line("G28").await,
            Err(EnderError::NotConnected)
        ));
    }
}
