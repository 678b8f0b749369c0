//! Append-only activity log.
//!
//! Unlike the `tracing` console diagnostics, this is the user-facing record
//! of what the loop actually did: one line per event, in the fixed shape
//! `[YYYY-MM-DD HH:MM:SS] [LEVEL] [notidle] message`, appended to a
//! user-configured file. The handle is explicit and cheap to clone; there is
//! no process-wide logging singleton.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

use crate::utils::paths;

/// Component tag written into every log line.
const COMPONENT: &str = "notidle";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of an activity log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        })
    }
}

/// Handle over the activity log file.
///
/// The target file and its parent directory are created on first use and the
/// file is only ever appended to. A failed write is reported through
/// `tracing::warn!` and dropped; logging must never take the loop down.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    /// Handle over the given file path. `~` is expanded.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: paths::expand_tilde(path.as_ref()),
        }
    }

    /// The resolved log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a completed (or attempted) activity event.
    pub fn activity(&self, message: &str) {
        self.append(LogLevel::Info, message);
    }

    /// Record a non-fatal anomaly.
    pub fn warning(&self, message: &str) {
        self.append(LogLevel::Warning, message);
    }

    /// Record a failure.
    pub fn error(&self, message: &str) {
        self.append(LogLevel::Error, message);
    }

    /// Record a configuration change as `param old -> new`.
    pub fn config_change(&self, param: &str, old: impl fmt::Display, new: impl fmt::Display) {
        self.append(
            LogLevel::Info,
            &format!("Configuration updated: {param} {old} -> {new}"),
        );
    }

    /// Record the shutdown notice.
    pub fn shutdown(&self) {
        self.append(LogLevel::Info, "Graceful shutdown initiated");
    }

    fn append(&self, level: LogLevel, message: &str) {
        if let Err(err) = self.try_append(level, message) {
            warn!(
                error = %err,
                path = %self.path.display(),
                "Failed to append to activity log"
            );
        }
    }

    fn try_append(&self, level: LogLevel, message: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "[{}] [{}] [{}] {}",
            Local::now().format(TIMESTAMP_FORMAT),
            level,
            COMPONENT,
            message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    fn read_lines(log: &ActivityLog) -> Vec<String> {
        fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Split `[ts] [LEVEL] [component] message` into its four parts.
    fn parse_line(line: &str) -> (String, String, String, String) {
        let rest = line.strip_prefix('[').unwrap();
        let (ts, rest) = rest.split_once("] [").unwrap();
        let (level, rest) = rest.split_once("] [").unwrap();
        let (component, message) = rest.split_once("] ").unwrap();
        (
            ts.to_string(),
            level.to_string(),
            component.to_string(),
            message.to_string(),
        )
    }

    #[test]
    fn test_line_shape_and_levels() {
        let dir = TempDir::new().unwrap();
        let log = ActivityLog::new(dir.path().join("activity.log"));

        log.activity("cycle done");
        log.warning("slow injection");
        log.error("injection failed");

        let lines = read_lines(&log);
        assert_eq!(lines.len(), 3);

        let expected_levels = ["INFO", "WARNING", "ERROR"];
        for (line, expected) in lines.iter().zip(expected_levels) {
            let (ts, level, component, message) = parse_line(line);
            NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).unwrap();
            assert_eq!(level, expected);
            assert_eq!(component, "notidle");
            assert!(!message.is_empty());
        }
    }

    #[test]
    fn test_appends_never_truncate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("activity.log");
        fs::write(&path, "preexisting line\n").unwrap();

        let log = ActivityLog::new(&path);
        log.activity("first");
        log.activity("second");

        let lines = read_lines(&log);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "preexisting line");
        assert!(lines[1].ends_with("first"));
        assert!(lines[2].ends_with("second"));
    }

    #[test]
    fn test_parent_directory_created_on_first_use() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep/nested/activity.log");

        let log = ActivityLog::new(&nested);
        log.activity("hello");

        assert!(nested.exists());
        assert_eq!(read_lines(&log).len(), 1);
    }

    #[test]
    fn test_config_change_and_shutdown_messages() {
        let dir = TempDir::new().unwrap();
        let log = ActivityLog::new(dir.path().join("activity.log"));

        log.config_change("interval_seconds", 300, 120);
        log.shutdown();

        let lines = read_lines(&log);
        let (_, _, _, change) = parse_line(&lines[0]);
        assert_eq!(change, "Configuration updated: interval_seconds 300 -> 120");
        let (_, level, _, notice) = parse_line(&lines[1]);
        assert_eq!(level, "INFO");
        assert_eq!(notice, "Graceful shutdown initiated");
    }
}
