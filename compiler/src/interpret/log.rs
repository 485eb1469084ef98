//! Run log entries and the sinks they are appended to.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Info,
    Success,
    Error,
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogStatus::Info => write!(f, "info"),
            LogStatus::Success => write!(f, "success"),
            LogStatus::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub status: LogStatus,
    /// Local wall-clock time, `HH:MM:SS`.
    pub time: String,
}

/// Append-only destination for log entries.
pub trait LogSink {
    fn append(&mut self, entry: LogEntry);
}

impl LogSink for Vec<LogEntry> {
    fn append(&mut self, entry: LogEntry) {
        self.push(entry);
    }
}

/// Streams entries to a channel; a dropped receiver just discards them.
impl LogSink for UnboundedSender<LogEntry> {
    fn append(&mut self, entry: LogEntry) {
        let _ = self.send(entry);
    }
}

/// Shared log that other tasks can read while a run is still appending.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything appended so far.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        // Entries are only ever pushed, so a poisoned lock still holds a valid prefix.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogSink for ExecutionLog {
    fn append(&mut self, entry: LogEntry) {
        self.lock().push(entry);
    }
}
