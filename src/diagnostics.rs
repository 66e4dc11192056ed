//! Append-only diagnostic log for rejected or failed updates.
//!
//! Lines have the form `[YYYY-MM-DD HH:MM:SS] <message>` with the timestamp
//! rendered in the configured zone. This log is separate from the process's
//! `tracing` output: it is the plain-text trail operators tail next to the
//! binary.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono_tz::Tz;

use crate::clock::{format_timestamp, Clock};

/// Sink for diagnostic lines. Recording never fails the caller.
pub trait DiagnosticLog: Send + Sync {
    fn record(&self, message: &str);
}

/// Build one log line, including the trailing newline.
pub fn format_line(timestamp: &str, message: &str) -> String {
    format!("[{}] {}\n", timestamp, message)
}

/// Diagnostic log appended to a file on disk.
pub struct FileDiagnosticLog {
    path: PathBuf,
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl FileDiagnosticLog {
    pub fn new(path: impl Into<PathBuf>, tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            tz,
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DiagnosticLog for FileDiagnosticLog {
    fn record(&self, message: &str) {
        let line = format_line(&format_timestamp(self.clock.now(), self.tz), message);

        // One write_all per line in append mode keeps concurrent lines whole.
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                file.write_all(line.as_bytes())?;
                file.flush()
            });

        if let Err(e) = result {
            tracing::error!(
                error = %e,
                path = %self.path.display(),
                diagnostic = message,
                "Failed to write diagnostic log"
            );
        }
    }
}

/// Diagnostic log kept in memory.
pub struct MemoryDiagnosticLog {
    tz: Tz,
    clock: Arc<dyn Clock>,
    lines: Mutex<Vec<String>>,
}

impl MemoryDiagnosticLog {
    pub fn new(tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self {
            tz,
            clock,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Recorded lines without their trailing newline.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DiagnosticLog for MemoryDiagnosticLog {
    fn record(&self, message: &str) {
        let line = format_line(&format_timestamp(self.clock.now(), self.tz), message);
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.trim_end_matches('\n').to_string());
    }
}
