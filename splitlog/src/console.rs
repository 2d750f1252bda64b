use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

use splitlog_core::{AtomicLevel, ConsoleWriter, Level, LogRecord, LogWriter};

use crate::{ConfigMap, ConsoleSettings, Logger};

/// Writes records to standard output on the calling thread.
pub struct ConsoleLogger {
    level: AtomicLevel,
    writer: Mutex<ConsoleWriter<Box<dyn Write + Send>>>,
}

impl ConsoleLogger {
    pub fn new(level: Level) -> Self {
        Self::with_writer(level, std::io::stdout())
    }

    /// Console logger writing to `out` instead of standard output.
    pub fn with_writer<W: Write + Send + 'static>(level: Level, out: W) -> Self {
        Self {
            level: AtomicLevel::new(level),
            writer: Mutex::new(ConsoleWriter::new(Box::new(out))),
        }
    }

    pub fn from_config(config: &ConfigMap) -> Self {
        Self::new(ConsoleSettings::from_map(config).level)
    }
}

impl Logger for ConsoleLogger {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, record: LogRecord) {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(&record);
    }

    fn flush(&self) {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();
    }

    fn close(&self) {
        self.flush();
    }
}
