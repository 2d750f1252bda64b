use std::sync::{Arc, OnceLock};

use log::LevelFilter;
use splitlog_core::{Error, Level, LogRecord, Result};

use crate::{ConfigMap, ConsoleLogger, FileLogger, LogBridge, Logger};

/// Builds the sink named `name`: `"file"` or `"console"`.
pub fn new_logger(name: &str, config: &ConfigMap) -> Result<Arc<dyn Logger>> {
    match name {
        "file" => Ok(Arc::new(FileLogger::from_config(config)?)),
        "console" => Ok(Arc::new(ConsoleLogger::from_config(config))),
        other => Err(Error::UnknownSink(other.to_string())),
    }
}

/// Holds the single active sink of an application.
///
/// Pass it by reference to the code that logs. It implements [`Logger`] and
/// discards everything until initialized.
#[derive(Default)]
pub struct Registry {
    active: OnceLock<Arc<dyn Logger>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the active sink. On error the registry stays uninitialized.
    pub fn init(&self, name: &str, config: &ConfigMap) -> Result<Arc<dyn Logger>> {
        if self.active.get().is_some() {
            return Err(Error::AlreadyInitialized);
        }
        let logger = new_logger(name, config)?;
        self.active
            .set(Arc::clone(&logger))
            .map_err(|_| Error::AlreadyInitialized)?;
        Ok(logger)
    }

    pub fn logger(&self) -> Option<&Arc<dyn Logger>> {
        self.active.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.active.get().is_some()
    }
}

impl Logger for Registry {
    fn level(&self) -> Level {
        self.logger().map(|l| l.level()).unwrap_or_default()
    }

    fn set_level(&self, level: Level) {
        if let Some(logger) = self.logger() {
            logger.set_level(level);
        }
    }

    fn enabled(&self, level: Level) -> bool {
        self.logger().is_some_and(|l| l.enabled(level))
    }

    fn emit(&self, record: LogRecord) {
        if let Some(logger) = self.logger() {
            logger.emit(record);
        }
    }

    fn flush(&self) {
        if let Some(logger) = self.logger() {
            logger.flush();
        }
    }

    fn close(&self) {
        if let Some(logger) = self.logger() {
            logger.close();
        }
    }
}

/// Closes the sink installed by [`init_global`] when dropped.
pub struct LoggerGuard {
    logger: Arc<dyn Logger>,
}

impl LoggerGuard {
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        self.logger.close();
    }
}

/// Installs the sink named `name` behind the `log` crate macros.
/// Hold the returned guard for the lifetime of your logging session.
#[must_use = "LoggerGuard must be kept alive to ensure logging works. Do \"let _guard = init_global(..)?;\""]
pub fn init_global(name: &str, config: &ConfigMap) -> Result<LoggerGuard> {
    let logger = new_logger(name, config)?;
    log::set_boxed_logger(Box::new(LogBridge::new(Arc::clone(&logger))))
        .map_err(|_| Error::AlreadyInitialized)?;
    log::set_max_level(LevelFilter::Trace);
    Ok(LoggerGuard { logger })
}
