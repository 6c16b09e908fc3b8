//! Operator-facing startup log.
//!
//! The startup log is a plain append-only text file: one line per record,
//! `YYYY-MM-DD HH:MM:SS - <message>`. It has no rotation and no structured
//! fields. Every record is mirrored to `tracing` as well, so the same
//! events show up in the journal when running under systemd.
//!
//! Sinks are injected into the sequencer through [`StartupLog`], which lets
//! tests swap the file for a [`MemoryLog`].

use bitsy_shared::errors::{BitsyError, BitsyResult};
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a startup log record.
///
/// Only used to prefix the message text and pick the tracing level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn decorate(self, message: &str) -> String {
        match self {
            Severity::Info => message.to_string(),
            Severity::Warning => format!("WARNING: {}", message),
            Severity::Error => format!("ERROR: {}", message),
        }
    }
}

/// One line of the startup log.
#[derive(Clone, Debug)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogRecord {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }

    /// Render as a single newline-terminated line.
    pub fn render(&self) -> String {
        format!(
            "{} - {}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.message
        )
    }
}

/// Sink for startup log records.
pub trait StartupLog: Send + Sync {
    /// Append one record. Implementations must write the whole line at once.
    fn append(&self, record: &LogRecord) -> BitsyResult<()>;

    /// Record a message and mirror it to tracing.
    ///
    /// A sink failure is reported through tracing only; losing a log line
    /// never aborts startup.
    fn record(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }

        let record = LogRecord::now(severity.decorate(message));
        if let Err(e) = self.append(&record) {
            tracing::warn!(error = %e, "Failed to append to startup log");
        }
    }

    fn info(&self, message: &str) {
        self.record(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.record(Severity::Error, message);
    }
}

/// Startup log backed by an append-only file.
///
/// The file is opened in append mode for every record, so concurrent
/// sequencer invocations interleave whole lines.
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StartupLog for FileLog {
    fn append(&self, record: &LogRecord) -> BitsyResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                BitsyError::Storage(format!(
                    "Failed to create log directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                BitsyError::Storage(format!(
                    "Failed to open startup log {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.write_all(record.render().as_bytes()).map_err(|e| {
            BitsyError::Storage(format!(
                "Failed to write startup log {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// In-memory startup log for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in the order they were recorded.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Whether any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records.lock().iter().any(|r| r.message.contains(needle))
    }
}

impl StartupLog for MemoryLog {
    fn append(&self, record: &LogRecord) -> BitsyResult<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
