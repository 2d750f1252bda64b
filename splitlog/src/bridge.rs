use std::sync::Arc;

use log::{Log, Metadata, Record};
use splitlog_core::{Level, Location};

use crate::Logger;

/// Target of splitlog's own diagnostics. Never routed back into a sink.
const INTERNAL_TARGET: &str = "splitlog";

/// Routes records from the `log` crate macros to a [`Logger`].
pub struct LogBridge {
    logger: Arc<dyn Logger>,
}

impl LogBridge {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target() != INTERNAL_TARGET
            && Logger::enabled(&*self.logger, metadata.level().into())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let location = Location {
            file: record.file().unwrap_or("<unknown>"),
            function: record.module_path().unwrap_or("<unknown>"),
            line: record.line().unwrap_or(0),
        };
        Logger::log(
            &*self.logger,
            Level::from(record.level()),
            location,
            *record.args(),
        );
    }

    fn flush(&self) {
        Logger::flush(&*self.logger);
    }
}
