use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::Mutex,
};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes `[LEVEL] message` lines to stderr and, optionally, appends them to a file.
pub struct StatsLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl StatsLogger {
    pub fn new(level: LevelFilter, path: Option<&Path>) -> io::Result<Self> {
        let file = match path {
            Some(path) => Some(Mutex::new(
                OpenOptions::new().append(true).create(true).open(path)?,
            )),
            None => None,
        };
        Ok(StatsLogger { level, file })
    }

    pub fn line(record: &Record) -> String {
        format!("[{}] {}", record.level(), record.args())
    }
}

impl Log for StatsLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::line(record);
        eprintln!("{}", line);
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

pub fn init(logger: StatsLogger) -> Result<(), SetLoggerError> {
    let level = logger.level;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
use log::Level;

#[test]
fn verbosity_raises_level() {
    assert_eq!(level_for(0), LevelFilter::Warn);
    assert_eq!(level_for(1), LevelFilter::Info);
    assert_eq!(level_for(4), LevelFilter::Debug);
}

#[test]
fn appends_enabled_lines_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.log");
    std::fs::write(&path, "earlier run\n").unwrap();

    let logger = StatsLogger::new(LevelFilter::Info, Some(&path)).unwrap();
    logger.log(
        &Record::builder()
            .level(Level::Info)
            .args(format_args!("Wrote {}", "nOfSolutions.txt"))
            .build(),
    );
    logger.log(
        &Record::builder()
            .level(Level::Debug)
            .args(format_args!("hidden"))
            .build(),
    );
    logger.flush();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "earlier run\n[INFO] Wrote nOfSolutions.txt\n");
}
