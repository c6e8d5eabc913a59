//! Append-only session log at `<state_dir>/setup.log`.

use chrono::{Local, NaiveDateTime};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::defaults::LOG_TIMESTAMP_FORMAT;

/// `log` backend writing `[timestamp] [LEVEL] message` lines to a file.
///
/// When the file disappears mid-run it is recreated, but only while its directory still
/// exists: a rollback that deletes the state directory must not bring it back.
pub struct FileLogger {
    path: PathBuf,
    level: LevelFilter,
    file: Mutex<Option<File>>,
}

impl FileLogger {
    pub fn new(path: PathBuf, level: LevelFilter) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        Ok(Self {
            path,
            level,
            file: Mutex::new(Some(file)),
        })
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if !self.path.exists() {
            let dir_exists = self.path.parent().is_some_and(Path::is_dir);
            *guard = if dir_exists {
                Some(open_append(&self.path)?)
            } else {
                None
            };
        }

        match guard.as_mut() {
            Some(file) => file.write_all(line.as_bytes()),
            None => Ok(()),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn format_line(at: NaiveDateTime, level: Level, message: &str) -> String {
    format!(
        "[{}] [{}] {}\n",
        at.format(LOG_TIMESTAMP_FORMAT),
        level,
        message
    )
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(
            Local::now().naive_local(),
            record.level(),
            &record.args().to_string(),
        );
        // A failing log write must never take the session down with it
        let _ = self.write_line(&line);
    }

    fn flush(&self) {
        let mut guard = self
            .file
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(file) = guard.as_mut() {
            let _ = file.flush();
        }
    }
}

/// Install the file logger as the global `log` backend. Info by default, debug with
/// `verbose`. Failing to open the log is reported and the run continues unlogged.
pub fn init_logging(log_path: &Path, verbose: bool) -> bool {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let logger = match FileLogger::new(log_path.to_path_buf(), level) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!(
                "  {} Cannot open log file {}: {}",
                console::style("!").yellow(),
                log_path.display(),
                e
            );
            return false;
        }
    };

    if log::set_boxed_logger(Box::new(logger)).is_err() {
        return false;
    }
    log::set_max_level(level);
    log::info!("sfm {} started", env!("CARGO_PKG_VERSION"));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record_at(logger: &FileLogger, level: Level, message: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .args(format_args!("{}", message))
                .build(),
        );
    }

    #[test]
    fn test_format_line() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();
        assert_eq!(
            format_line(at, Level::Warn, "zsh not found"),
            "[2024-03-09 14:05:07] [WARN] zsh not found\n"
        );
    }

    #[test]
    fn test_respects_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.log");
        let logger = FileLogger::new(path.clone(), LevelFilter::Info).unwrap();

        record_at(&logger, Level::Info, "kept");
        record_at(&logger, Level::Debug, "dropped");
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] kept"));
        assert!(!content.contains("dropped"));
    }

    #[test]
    fn test_appends_across_loggers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.log");

        record_at(&FileLogger::new(path.clone(), LevelFilter::Info).unwrap(), Level::Info, "one");
        record_at(&FileLogger::new(path.clone(), LevelFilter::Info).unwrap(), Level::Info, "two");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_does_not_recreate_deleted_directory() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join(".sfm");
        let path = state.join("setup.log");
        let logger = FileLogger::new(path.clone(), LevelFilter::Info).unwrap();

        std::fs::remove_dir_all(&state).unwrap();
        record_at(&logger, Level::Info, "after rollback");

        assert!(!state.exists());
    }

    #[test]
    fn test_recreates_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.log");
        let logger = FileLogger::new(path.clone(), LevelFilter::Info).unwrap();

        std::fs::remove_file(&path).unwrap();
        record_at(&logger, Level::Error, "again");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[ERROR] again"));
    }
}
