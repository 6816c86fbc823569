//! Append-only run log.
//!
//! One line per retention pass, in the format operators already watch:
//!
//! ```text
//! 2024-06-01 02:30:00 - Deleted: 42
//! ```
//!
//! A failed pass appends the error text instead, so the file receives an
//! entry on every invocation regardless of outcome. The file is never
//! rotated or truncated by this service.

use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};

use crate::config::RunLogConfig;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writer for the append-only run log file.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build a run log from configuration; `None` when disabled.
    pub fn from_config(config: &RunLogConfig) -> Option<Self> {
        config.enabled.then(|| Self::new(&config.path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a completed pass: `<timestamp> - Deleted: <count>`.
    pub fn record_success(&self, timestamp: DateTime<Utc>, deleted: u64) -> io::Result<()> {
        self.append(&format!(
            "{} - Deleted: {}",
            timestamp.format(TIMESTAMP_FORMAT),
            deleted
        ))
    }

    /// Record a failed pass: the error text, timestamped.
    pub fn record_failure(&self, timestamp: DateTime<Utc>, error: &str) -> io::Result<()> {
        self.append(&format!(
            "{} - Error: {}",
            timestamp.format(TIMESTAMP_FORMAT),
            error
        ))
    }

    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)
    }
}
