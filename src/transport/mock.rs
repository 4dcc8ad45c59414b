//! # Mock Transport
//!
//! Records every line sent and answers from scripted replies. Clones share
//! the same storage, so a test can keep a handle after moving a clone into
//! a session.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Transport;
use crate::error::{EnderError, Result};

#[derive(Clone)]
pub struct MockTransport {
    sent: Arc<Mutex<Vec<String>>>,
    /// Replies keyed by command word (e.g. "M114")
    replies: Arc<Mutex<HashMap<String, Vec<String>>>>,
    fail_at: Option<usize>,
    open: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(HashMap::new())),
            fail_at: None,
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Answer every line starting with `command` with `lines`.
    pub async fn respond_to(&self, command: &str, lines: &[&str]) {
        self.replies.lock().await.insert(
            command.to_string(),
            lines.iter().map(|line| line.to_string()).collect(),
        );
    }

    /// Fail the send with this 0-based index.
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// All lines sent so far.
    pub async fn sent_lines(&self) -> Vec<String> {
        self.sent.lock().await.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_line(&mut self, line: &str) -> Result<Vec<String>> {
        if !self.is_open() {
            return Err(EnderError::NotConnected);
        }

        let mut sent = self.sent.lock().await;
        if self.fail_at == Some(sent.len()) {
            return Err(EnderError::transport(format!("injected failure on '{}'", line)));
        }
        sent.push(line.to_string());

        let command = line.split_whitespace().next().unwrap_or_default();
        let replies = self.replies.lock().await;
        Ok(replies.get(command).cloned().unwrap_or_default())
    }

    async fn flush(&mut self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(EnderError::NotConnected)
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
