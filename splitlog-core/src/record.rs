use std::path::Path;

use chrono::{DateTime, Local};

use crate::Level;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Call site of a log statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location<'a> {
    pub file: &'a str,
    /// Module path of the caller.
    pub function: &'a str,
    pub line: u32,
}

/// Expands to the [`Location`] of the macro invocation.
#[macro_export]
macro_rules! location {
    () => {
        $crate::Location {
            file: file!(),
            function: module_path!(),
            line: line!(),
        }
    };
}

/// A formatted log entry, created at the call site and consumed once by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: String,
    pub level: Level,
    pub file: String,
    pub function: String,
    pub line: u32,
    pub message: String,
    /// Set for `Warn` and above: the record also goes to the warning file.
    pub warning: bool,
}

impl LogRecord {
    pub fn new(level: Level, location: Location<'_>, message: String) -> Self {
        Self::at(Local::now(), level, location, message)
    }

    pub fn at(time: DateTime<Local>, level: Level, location: Location<'_>, message: String) -> Self {
        let file = Path::new(location.file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| location.file.to_string());
        Self {
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            level,
            file,
            function: location.function.to_string(),
            line: location.line,
            message,
            warning: level.is_warning(),
        }
    }

    /// Renders `<timestamp> <Level> [<file>:<function>:<line>] <message>`, without newline.
    pub fn line(&self) -> String {
        self.line_with_level(self.level.label())
    }

    pub(crate) fn line_with_level(&self, level: impl std::fmt::Display) -> String {
        let Self {
            timestamp,
            file,
            function,
            line,
            message,
            ..
        } = self;
        format!("{timestamp} {level} [{file}:{function}:{line}] {message}")
    }
}
