use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use log::{LevelFilter, Log, Metadata, Record};

/// Appends log records to a file. The terminal belongs to the TUI, so
/// nothing is ever written to stdout/stderr from here.
pub struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    pub fn open(path: &Path, level: LevelFilter) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            level,
            file: Mutex::new(file),
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{} {:<5} [{}] {}\n",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            record.level(),
            record.target(),
            record.args()
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

pub fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kanjidr")
        .join("kanjidr.log")
}

/// Install the file logger as the global `log` sink.
pub fn init(path: &Path, level: LevelFilter) -> Result<()> {
    let logger = FileLogger::open(path, level)?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use tempfile::TempDir;

    #[test]
    fn test_writes_records_at_or_above_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("test.log");
        let logger = FileLogger::open(&path, LevelFilter::Info).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("kanjidr::app")
                .args(format_args!("session started"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .args(format_args!("too chatty"))
                .build(),
        );
        logger.flush();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("INFO  [kanjidr::app] session started"));
        assert!(!content.contains("too chatty"));
    }
}
